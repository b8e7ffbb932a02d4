use thiserror::Error;

pub type Result<T> = std::result::Result<T, BloomError>;

#[derive(Error, Debug)]
pub enum BloomError {
    #[error("Storage operation failed: {0}")]
    StorageError(String),

    #[error("Index out of bounds: {index} >= {capacity}")]
    IndexOutOfBounds { index: u64, capacity: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Capacity must be greater than 0")]
    ZeroCapacity,

    #[error("False positive rate must be between 0 and 1, got {rate}")]
    InvalidFalsePositiveRate { rate: f64 },

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),
}

impl BloomError {
    /// True when the error originated in the backing store rather than in
    /// argument validation. A storage error from `add` may leave the item
    /// partially written; retrying the whole `add` is safe.
    pub fn is_storage(&self) -> bool {
        match self {
            BloomError::StorageError(_) => true,
            #[cfg(feature = "redis")]
            BloomError::RedisError(_) => true,
            _ => false,
        }
    }
}
