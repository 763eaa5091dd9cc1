//! Error taxonomy for the engine
//!
//! Every fallible operation returns [`Result`]. Errors carry a
//! machine-checkable [`ErrorKind`] and a human-readable message.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BipersError>;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or inconsistent bifiltration / input file
    InputData,
    /// Out-of-range or incompatible parameter
    Parameter,
    /// Internal reduction invariant violated
    Computation,
    /// Unreadable or unwritable path
    Io,
}

#[derive(Error, Debug)]
pub enum BipersError {
    #[error("Invalid input data: {0}")]
    InputData(String),

    #[error("Invalid parameter: {0}")]
    Parameter(String),

    #[error("Query batch line {line}: {message}")]
    QueryBatch { line: usize, message: String },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BipersError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::InputData(msg.into())
    }

    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }

    pub fn computation(msg: impl Into<String>) -> Self {
        Self::Computation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputData(_) | Self::Serialization(_) => ErrorKind::InputData,
            Self::Parameter(_) | Self::QueryBatch { .. } => ErrorKind::Parameter,
            Self::Computation(_) => ErrorKind::Computation,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<tempfile::PersistError> for BipersError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(BipersError::input("x").kind(), ErrorKind::InputData);
        assert_eq!(BipersError::parameter("x").kind(), ErrorKind::Parameter);
        assert_eq!(BipersError::computation("x").kind(), ErrorKind::Computation);
        let batch = BipersError::QueryBatch { line: 3, message: "angle".into() };
        assert_eq!(batch.kind(), ErrorKind::Parameter);
        assert!(batch.to_string().contains("line 3"));
        let io = BipersError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.kind(), ErrorKind::Io);
    }
}
