use std::{fs::File, io};

use csv::{ReaderBuilder, Trim};
use log::info;
use machine_learning::{
    MlErr,
    data::{Dataset, DatasetProvider},
};

use crate::TrainerError;

/// Reads labeled samples from csv files where every record is `label,f1,...,fD`.
///
/// Raw feature values are divided by `pixel_scale`, so 8 bit pixels end up in `[0, 1]` with the
/// default scale of 255.
#[derive(Debug, Clone, Copy)]
pub struct CsvProvider {
    pub x_size: usize,
    pub classes: usize,
    pub has_headers: bool,
    pub pixel_scale: f64,
}

impl CsvProvider {
    /// Parses a whole csv document.
    ///
    /// # Arguments
    /// * `name` - How to refer to the document in errors.
    /// * `reader` - The csv contents.
    ///
    /// # Errors
    /// * `MlErr::MalformedTable` if a record has the wrong amount of fields, a value is not a
    ///   number or a scaled feature falls outside `[0, 1]`.
    /// * `MlErr::InvalidLabel` if a label is not one of the `classes`.
    pub fn read<R: io::Read>(&self, name: &str, reader: R) -> Result<Dataset, TrainerError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map_or(index + 1, |pos| pos.line() as usize);

            let malformed = |reason: String| MlErr::MalformedTable {
                table: name.to_string(),
                line,
                reason,
            };

            if record.len() != self.x_size + 1 {
                return Err(malformed(format!(
                    "expected {} fields, found {}",
                    self.x_size + 1,
                    record.len()
                ))
                .into());
            }

            let label = record[0]
                .parse::<usize>()
                .map_err(|e| malformed(format!("label {:?}: {e}", &record[0])))?;

            if label >= self.classes {
                return Err(MlErr::InvalidLabel {
                    index,
                    label,
                    classes: self.classes,
                }
                .into());
            }

            for value in record.iter().skip(1) {
                let raw = value
                    .parse::<f64>()
                    .map_err(|e| malformed(format!("{value:?}: {e}")))?;

                let feature = raw / self.pixel_scale;
                if !(0. ..=1.).contains(&feature) {
                    return Err(malformed(format!(
                        "{value:?} scaled by {} is {feature}, outside of [0, 1]",
                        self.pixel_scale
                    ))
                    .into());
                }
                features.push(feature);
            }

            labels.push(label);
        }

        Ok(Dataset::from_vec(features, labels, self.x_size)?)
    }
}

impl DatasetProvider for CsvProvider {
    type Error = TrainerError;

    fn load(&self, path: &str) -> Result<Dataset, Self::Error> {
        let dataset = self.read(path, File::open(path)?)?;
        info!("loaded {} samples from {path}", dataset.len());
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(has_headers: bool) -> CsvProvider {
        CsvProvider {
            x_size: 3,
            classes: 2,
            has_headers,
            pixel_scale: 255.,
        }
    }

    #[test]
    fn reads_and_scales() {
        let text = "label,p0,p1,p2\n1,0,255,51\n0, 255 ,0,0\n";
        let ds = provider(true).read("mem", text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 2);
        let (x, y) = ds.sample(0);
        assert_eq!(y, 1);
        assert_eq!(x.to_vec(), [0., 1., 0.2]);
        assert_eq!(ds.sample(1).0[0], 1.);
    }

    #[test]
    fn wrong_width_fails() {
        let err = provider(false).read("mem", "1,0,0,0\n0,0,0\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrainerError::Ml(MlErr::MalformedTable { line: 2, .. })
        ));
    }

    #[test]
    fn label_out_of_range_fails() {
        let err = provider(false).read("mem", "0,0,0,0\n2,0,0,0\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TrainerError::Ml(MlErr::InvalidLabel {
                index: 1,
                label: 2,
                classes: 2
            })
        ));
    }

    #[test]
    fn garbage_fails() {
        assert!(provider(false).read("mem", "x,0,0,0\n".as_bytes()).is_err());
        assert!(provider(false).read("mem", "1,0,a,0\n".as_bytes()).is_err());
    }

    #[test]
    fn unnormalized_features_fail() {
        let provider = CsvProvider {
            x_size: 2,
            ..provider(false)
        };

        for text in ["0,510,0\n", "0,0,-255\n", "1,NaN,0\n", "1,0,inf\n"] {
            assert!(
                matches!(
                    provider.read("mem", text.as_bytes()),
                    Err(TrainerError::Ml(MlErr::MalformedTable { line: 1, .. }))
                ),
                "{text:?} was accepted"
            );
        }

        let ds = provider.read("mem", "0,255,0\n1,0,127.5\n".as_bytes()).unwrap();
        assert_eq!(ds.sample(1).0.to_vec(), [0., 0.5]);
    }

    #[test]
    fn missing_file_fails() {
        assert!(matches!(
            provider(false).load("/definitely/not/here.csv"),
            Err(TrainerError::Io(_))
        ));
    }
}
