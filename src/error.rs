use std::fmt;

use thiserror::Error;

/// The policy that forbade an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    /// The cursor was built `ForwardOnly` and the operation needs to scroll.
    ForwardOnly,
    /// The cursor was built `ReadOnly` and the operation mutates data.
    ReadOnly,
}
impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Restriction::ForwardOnly => write!(f, "cursor is forward only"),
            Restriction::ReadOnly => write!(f, "cursor is read only"),
        }
    }
}

/// Coarse classification of a fault, so callers can tell bad calls from bad data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCategory {
    Programmer,
    Data,
    Environment,
}

#[derive(Error, Debug)]
pub enum RowfileError {
    #[error("Column index {ordinal} out of range 1..={column_count}")]
    IndexOutOfRange { ordinal: usize, column_count: usize },
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Invalid cursor state: {0}")]
    InvalidCursorState(String),
    #[error("Illegal cursor operation {operation}: {restriction}")]
    IllegalCursorOperation {
        operation: &'static str,
        restriction: Restriction,
    },
    #[error("Conversion failed: '{text}' as {target}: {reason}")]
    ConversionFailed {
        text: String,
        target: &'static str,
        reason: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(String),
}

impl RowfileError {
    pub fn category(&self) -> FaultCategory {
        match self {
            RowfileError::IndexOutOfRange { .. }
            | RowfileError::UnknownColumn(_)
            | RowfileError::InvalidCursorState(_)
            | RowfileError::IllegalCursorOperation { .. } => FaultCategory::Programmer,
            RowfileError::ConversionFailed { .. } => FaultCategory::Data,
            RowfileError::Io(_) | RowfileError::Config(_) => FaultCategory::Environment,
        }
    }
    /// True for a bad column ordinal or an unknown column label.
    pub fn is_column_fault(&self) -> bool {
        matches!(
            self,
            RowfileError::IndexOutOfRange { .. } | RowfileError::UnknownColumn(_)
        )
    }
    pub(crate) fn state(message: impl Into<String>) -> Self {
        Self::InvalidCursorState(message.into())
    }
    pub(crate) fn conversion(
        text: &str,
        target: &'static str,
        reason: impl fmt::Display,
    ) -> Self {
        Self::ConversionFailed {
            text: text.to_owned(),
            target,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RowfileError>;

// Helper conversions
impl From<config::ConfigError> for RowfileError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
impl From<csv::Error> for RowfileError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            match e.into_kind() {
                csv::ErrorKind::Io(io) => Self::Io(io),
                other => Self::Io(std::io::Error::other(format!("{other:?}"))),
            }
        } else {
            Self::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        }
    }
}
