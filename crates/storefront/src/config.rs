//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LUMIERE_API_URL` - Base URL of the commerce API (e.g. `https://shop.example.com/wp-json`)
//! - `LUMIERE_CONSUMER_KEY` - Catalog API consumer key (query credential)
//! - `LUMIERE_CONSUMER_SECRET` - Catalog API consumer secret (query credential)
//!
//! ## Optional
//! - `LUMIERE_STORAGE_DIR` - Directory for persisted local state
//!   (default: `.lumiere`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Commerce API connection settings.
    pub commerce: CommerceConfig,
    /// Directory holding persisted local state (cart, wishlist, session).
    pub storage_dir: PathBuf,
}

/// Commerce API configuration.
///
/// Implements `Debug` manually to redact the consumer secret.
#[derive(Clone)]
pub struct CommerceConfig {
    /// Base URL of the commerce API, without a trailing slash.
    pub base_url: Url,
    /// Consumer key appended to catalog-namespace requests.
    pub consumer_key: String,
    /// Consumer secret appended to catalog-namespace requests.
    pub consumer_secret: SecretString,
}

impl std::fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("base_url", &self.base_url.as_str())
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let commerce = CommerceConfig::from_env()?;
        let storage_dir = PathBuf::from(get_env_or_default("LUMIERE_STORAGE_DIR", ".lumiere"));

        Ok(Self {
            commerce,
            storage_dir,
        })
    }
}

impl CommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("LUMIERE_API_URL")?;
        let base_url = Url::parse(raw_url.trim_end_matches('/'))
            .map_err(|e| ConfigError::InvalidEnvVar("LUMIERE_API_URL".to_string(), e.to_string()))?;

        Ok(Self {
            base_url,
            consumer_key: get_required_env("LUMIERE_CONSUMER_KEY")?,
            consumer_secret: SecretString::from(get_required_env("LUMIERE_CONSUMER_SECRET")?),
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

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
