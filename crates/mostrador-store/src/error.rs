//! # Store Error Types
//!
//! One error type over the three layers the store composes. Business rule
//! violations surface as [`mostrador_core::CoreError`] unchanged so the UI
//! can match on them.

use thiserror::Error;

use mostrador_cache::CacheError;
use mostrador_core::CoreError;
use mostrador_gateway::GatewayError;

/// Application state store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The local cache failed.
    #[error("Local cache error: {0}")]
    Cache(#[from] CacheError),

    /// The remote gateway failed (and the operation had no offline path).
    #[error("Remote gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The operation needs a signed-in session.
    #[error("No active session")]
    NoSession,

    /// A referenced record does not exist in the loaded state.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
