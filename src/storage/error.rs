use thiserror::Error;

/// Errors detected by the storage engine itself.
///
/// The container is left unchanged whenever one of these is returned,
/// except for `ZADD`, where pairs before the failing score stay applied.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// INCR/DECR on a value that does not parse as a base-10 integer
    #[error("value is not an integer")]
    NotAnInteger,

    /// INCR/DECR would leave the signed 64-bit range
    #[error("increment or decrement would overflow")]
    Overflow,

    /// ZADD score that is not a floating-point number
    #[error("Invalid score")]
    InvalidScore,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
