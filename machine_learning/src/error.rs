use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidLabel {
        index: usize,
        label: usize,
        classes: usize,
    },
    EmptyDataset,
    BatchTooLarge {
        batch_size: usize,
        len: usize,
    },
    InvalidHyperparameter {
        name: &'static str,
        reason: String,
    },
    MalformedTable {
        table: String,
        line: usize,
        reason: String,
    },
    Io(io::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch for {what}, got {got} and expected {expected}"
            ),
            MlErr::InvalidLabel {
                index,
                label,
                classes,
            } => write!(
                f,
                "Sample {index} has label {label}, which is outside of the {classes} classes"
            ),
            MlErr::EmptyDataset => write!(f, "The dataset has no samples"),
            MlErr::BatchTooLarge { batch_size, len } => write!(
                f,
                "The batch size ({batch_size}) exceeds the dataset size ({len}), no batch would be processed"
            ),
            MlErr::InvalidHyperparameter { name, reason } => {
                write!(f, "Invalid value for {name}: {reason}")
            }
            MlErr::MalformedTable {
                table,
                line,
                reason,
            } => write!(f, "Malformed table {table} at line {line}: {reason}"),
            MlErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
