pub mod arch;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod initialization;
pub mod optimization;
pub mod persistence;
pub mod preprocess;
pub mod training;

pub use error::{MlErr, Result};
