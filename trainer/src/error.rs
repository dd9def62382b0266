use std::{fmt, io};

use machine_learning::MlErr;

/// All errors that can occur while running the trainer.
#[derive(Debug)]
pub enum TrainerError {
    /// Invalid configuration, caught before touching any data.
    InvalidConfig(String),
    /// The network, the dataset or the stored parameters were rejected.
    Ml(MlErr),
    /// The configuration file is not valid json.
    Json(serde_json::Error),
    /// A dataset file could not be parsed as csv.
    Csv(csv::Error),
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl fmt::Display for TrainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Ml(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for TrainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<MlErr> for TrainerError {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<serde_json::Error> for TrainerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<csv::Error> for TrainerError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<io::Error> for TrainerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
