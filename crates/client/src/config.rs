//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STORE_API_URL` - Backend base URL (default: `http://localhost:8000`)
//! - `STORE_SESSION_FILE` - Where the login marker is kept
//!   (default: `$HOME/.everything-store/session.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g. `development`)

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Default backend URL used by the development server.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Directory (under `$HOME`) holding client state.
const STATE_DIR: &str = ".everything-store";

/// File name of the persisted login marker.
const SESSION_FILE_NAME: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Path of the persisted session marker
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api", &self.api)
            .field("session_file", &self.session_file)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    pub base_url: Url,
}

impl ApiConfig {
    /// Parse an API configuration from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url("STORE_API_URL", base_url)?;
        Ok(Self { base_url })
    }
}

impl ClientConfig {
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

        let api = ApiConfig::parse(&get_env_or_default("STORE_API_URL", DEFAULT_API_URL))?;
        let session_file = get_optional_env("STORE_SESSION_FILE")
            .map_or_else(default_session_file, PathBuf::from);

        Ok(Self {
            api,
            session_file,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Build a configuration for a given backend and marker path, without
    /// error tracking. Used by tests and embedders.
    #[must_use]
    pub fn new(api: ApiConfig, session_file: impl AsRef<Path>) -> Self {
        Self {
            api,
            session_file: session_file.as_ref().to_path_buf(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Default marker location: `$HOME/.everything-store/session.json`, or the
/// working directory when `HOME` is not set.
fn default_session_file() -> PathBuf {
    get_optional_env("HOME").map_or_else(
        || PathBuf::from(STATE_DIR).join(SESSION_FILE_NAME),
        |home| PathBuf::from(home).join(STATE_DIR).join(SESSION_FILE_NAME),
    )
}

/// Parse and sanity-check a backend base URL.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_parse() {
        let api = ApiConfig::parse("http://localhost:8000").unwrap();
        assert_eq!(api.base_url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_api_config_rejects_bad_urls() {
        assert!(matches!(
            ApiConfig::parse("not a url"),
            Err(ConfigError::InvalidEnvVar(..))
        ));
        assert!(matches!(
            ApiConfig::parse("ftp://store.example.com"),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let mut config = ClientConfig::new(
            ApiConfig::parse(DEFAULT_API_URL).unwrap(),
            "/tmp/session.json",
        );
        config.sentry_dsn = Some("https://key@sentry.example.com/1".to_string());

        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("key@sentry"));
    }
}
