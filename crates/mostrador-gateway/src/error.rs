//! # Gateway Error Types
//!
//! ## Error Flow
//! ```text
//! missing env var       ─► GatewayError::MissingConfig
//! bad base URL          ─► GatewayError::InvalidUrl
//! reqwest failure       ─► GatewayError::Transport    (offline candidate)
//! known-offline         ─► GatewayError::Unreachable  (always offline)
//! non-2xx response      ─► GatewayError::Api
//! unparseable body      ─► GatewayError::Decode
//! ```
//! The store treats [`GatewayError::is_connectivity`] errors as "we are
//! offline" and falls back to the local cache; everything else surfaces.

use thiserror::Error;

/// Remote gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required configuration variable was not set.
    #[error("Missing gateway configuration: {var} is not set")]
    MissingConfig { var: &'static str },

    /// The configured base URL could not be parsed or joined.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response (DNS, connect, timeout).
    #[error("Gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service is known to be unreachable without a request having
    /// been attempted (monitor says offline, or a fake backend in tests).
    #[error("Gateway unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status.
    #[error("Gateway API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected row shape.
    #[error("Gateway decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether this error means "the network is unreachable" rather than
    /// "the request was wrong". Connectivity errors trigger the offline
    /// fallback path; API errors never do.
    pub fn is_connectivity(&self) -> bool {
        match self {
            GatewayError::Transport(err) => {
                err.is_connect() || err.is_timeout() || err.is_request()
            }
            GatewayError::Unreachable(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::InvalidUrl(err.to_string())
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
