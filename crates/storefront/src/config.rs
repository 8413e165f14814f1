//! Shopfront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (remote cart and catalog only)
//! - `SHOPFRONT_API_URL` - Base URL of the REST backend (e.g. `https://shop.example.com/api/`)
//!
//! ## Optional
//! - `SHOPFRONT_API_AUTHORIZATION` - Value forwarded verbatim in the `Authorization` header
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SHOPFRONT_CART_DIR` - Directory holding the persisted local cart (default: .shopfront)
//! - `SHOPFRONT_CART_SLOT` - Name of the persisted cart slot (default: cart-storage)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CART_DIR: &str = ".shopfront";
const DEFAULT_CART_SLOT: &str = "cart-storage";
const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration that does not require the backend.
#[derive(Debug, Clone)]
pub struct ShopfrontConfig {
    /// Local cart persistence
    pub cart: CartStorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Where the local cart is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStorageConfig {
    /// Directory containing the slot file
    pub dir: PathBuf,
    /// Slot name (file stem)
    pub slot: String,
}

impl Default for CartStorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CART_DIR),
            slot: DEFAULT_CART_SLOT.to_string(),
        }
    }
}

/// REST backend configuration.
///
/// Implements `Debug` manually to redact the authorization value.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Opaque `Authorization` header value
    pub authorization: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ShopfrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            cart: CartStorageConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl CartStorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dir = PathBuf::from(get_env_or_default("SHOPFRONT_CART_DIR", DEFAULT_CART_DIR));
        let slot = get_env_or_default("SHOPFRONT_CART_SLOT", DEFAULT_CART_SLOT);
        validate_slot(&slot, "SHOPFRONT_CART_SLOT")?;
        Ok(Self { dir, slot })
    }
}

impl ApiConfig {
    /// Load backend configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SHOPFRONT_API_URL` is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_required_env("SHOPFRONT_API_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e))?;
        let timeout = parse_timeout(&get_env_or_default(
            "SHOPFRONT_HTTP_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_HTTP_TIMEOUT_SECS".to_string(), e))?;

        Ok(Self {
            base_url,
            authorization: get_optional_env("SHOPFRONT_API_AUTHORIZATION").map(SecretString::from),
            timeout,
        })
    }

    /// Build a configuration for a known base URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL cannot be parsed.
    pub fn with_base_url(raw: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(raw)
            .map_err(|e| ConfigError::InvalidEnvVar("base_url".to_string(), e))?;
        Ok(Self {
            base_url,
            authorization: None,
            timeout: Duration::from_secs(30),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse the backend URL and make sure relative joins stay under its path.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("must be an absolute http(s) URL".to_string());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs = raw.trim().parse::<u64>().map_err(|e| e.to_string())?;
    if secs == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// The slot becomes a file name, so it must be a single path component.
fn validate_slot(slot: &str, var_name: &str) -> Result<(), ConfigError> {
    let valid = !slot.is_empty()
        && slot != "."
        && slot != ".."
        && !slot.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("'{slot}' is not a valid slot name"),
        ))
    }
}
