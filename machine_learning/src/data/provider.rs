use super::Dataset;

/// Something that can supply a labeled `Dataset` given an identifier, e.g. a file path.
///
/// The features must already be normalized into `[0, 1]`.
pub trait DatasetProvider {
    type Error;

    fn load(&self, id: &str) -> Result<Dataset, Self::Error>;
}
