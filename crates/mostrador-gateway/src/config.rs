//! # Gateway Configuration
//!
//! Connection settings for the hosted data service, loaded from the
//! environment (a `.env` file is honored in development).

use std::time::Duration;

use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Environment variable holding the service base URL.
const ENV_API_URL: &str = "MOSTRADOR_API_URL";
/// Environment variable holding the service API key.
const ENV_API_KEY: &str = "MOSTRADOR_API_KEY";
/// Optional request timeout override, in seconds.
const ENV_TIMEOUT_SECS: &str = "MOSTRADOR_API_TIMEOUT_SECS";

/// Default per-request timeout. Short enough that a dead network is
/// detected before the cashier notices, long enough for a slow link.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Remote gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the data service (the `/rest/v1/` prefix is appended
    /// per request).
    pub base_url: Url,

    /// API key, sent as both `apikey` and bearer token.
    pub api_key: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Creates a configuration from explicit values.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> GatewayResult<Self> {
        Ok(GatewayConfig {
            base_url: Url::parse(base_url)?,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Loads configuration from the environment.
    ///
    /// Reads `MOSTRADOR_API_URL` and `MOSTRADOR_API_KEY`; a `.env` file in
    /// the working directory is loaded first when present.
    pub fn from_env() -> GatewayResult<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var(ENV_API_URL)
            .map_err(|_| GatewayError::MissingConfig { var: ENV_API_URL })?;
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| GatewayError::MissingConfig { var: ENV_API_KEY })?;

        let timeout = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let mut config = GatewayConfig::new(&base_url, api_key)?;
        config.timeout = timeout;
        Ok(config)
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
