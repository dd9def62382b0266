mod dataset;
mod provider;
mod synthetic;

pub use dataset::{Batch, Dataset};
pub use provider::DatasetProvider;
pub use synthetic::Clusters;
