//! Error types for moment operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MomentError {
    #[error("Invalid date: {0}")]
    Parse(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Instant out of range: {0} ms")]
    OutOfRange(i64),
}

pub type Result<T> = std::result::Result<T, MomentError>;
