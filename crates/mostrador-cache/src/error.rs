//! # Cache Error Types
//!
//! ## Error Flow
//! ```text
//! sqlite error (sqlx::Error) ─► CacheError::Storage
//! bad key                    ─► CacheError::InvalidKey   (fails fast, no I/O)
//! serde_json error           ─► CacheError::Serialization
//! migration failure          ─► CacheError::MigrationFailed
//! ```
//! Callers treat any of these as "entity unavailable" and fall back to an
//! empty collection; nothing here is retried.

use thiserror::Error;

/// Local cache errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key failed validation before any storage access.
    ///
    /// Keys must be non-empty, at most 255 characters, and free of
    /// control characters.
    #[error("Invalid cache key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Underlying SQLite failure (I/O, disk full, closed pool).
    #[error("Cache storage failed: {0}")]
    Storage(String),

    /// A stored value could not be (de)serialized.
    #[error("Cache serialization failed: {0}")]
    Serialization(String),

    /// Opening the cache failed.
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed; the cache must not be used.
    #[error("Cache migration failed: {0}")]
    MigrationFailed(String),
}

impl CacheError {
    /// Creates an InvalidKey error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CacheError::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => CacheError::ConnectionFailed("pool is closed".to_string()),
            other => CacheError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
