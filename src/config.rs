//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup; a `.env` file is honored for local
//! development.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default fail-open timeout while bootstrapping a signed-in session.
const DEFAULT_PROFILE_TIMEOUT_SECS: u64 = 10;
/// Default HTTP client timeout for backend calls.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend RPC base URL. `None` runs against the offline in-memory backend.
    pub backend_url: Option<String>,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// View server port
    pub port: u16,
    /// Fail-open timeout while loading a signed-in session (`None` disables)
    pub profile_timeout: Option<Duration>,
    /// Number of retries after the first attempt for transient failures
    pub retry_attempts: u32,
    /// Delay between retry attempts
    pub retry_delay: Duration,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
    /// HS256 key used to verify identity tokens (raw bytes)
    pub identity_jwt_key: Vec<u8>,
}

impl Config {
    /// Deterministic config for tests: offline backend, no retry delay.
    pub fn test_default() -> Self {
        Self {
            backend_url: None,
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            profile_timeout: Some(Duration::from_secs(DEFAULT_PROFILE_TIMEOUT_SECS)),
            retry_attempts: 1,
            retry_delay: Duration::from_millis(0),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            identity_jwt_key: b"test_identity_key_32_bytes_min!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let profile_timeout_secs: u64 =
            parse_var("PROFILE_TIMEOUT_SECS", DEFAULT_PROFILE_TIMEOUT_SECS)?;

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_var("PORT", 8080)?,
            profile_timeout: (profile_timeout_secs > 0)
                .then(|| Duration::from_secs(profile_timeout_secs)),
            retry_attempts: parse_var("RETRY_ATTEMPTS", 1)?,
            retry_delay: Duration::from_millis(parse_var("RETRY_DELAY_MS", 1000)?),
            request_timeout: Duration::from_secs(parse_var(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            identity_jwt_key: env::var("IDENTITY_JWT_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_JWT_KEY"))?
                .into_bytes(),
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
