//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CARTWISE_API_URL` - Base URL of the cart/catalog backend
//!
//! ## Optional
//! - `CARTWISE_SESSION_TOKEN` - Session token; absent means local-only cart
//! - `CARTWISE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CARTWISE_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `CARTWISE_LOCAL_CART_PATH` - Where the CLI keeps the local cart (default: .cartwise-cart.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::session::SessionToken;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_LOCAL_CART_PATH: &str = ".cartwise-cart.json";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Cartwise client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., `https://api.cartwise.app`)
    pub api_url: Url,
    /// Session token; `None` selects the local-only cart
    pub session_token: Option<SessionToken>,
    /// Upper bound for each individual request
    pub request_timeout: Duration,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// File the CLI persists the local cart to
    pub local_cart_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            session_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            local_cart_path: PathBuf::from(DEFAULT_LOCAL_CART_PATH),
            sentry_dsn: None,
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let api_url = env
            .required("CARTWISE_API_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CARTWISE_API_URL".to_string(), e.to_string())
            })?;
        if api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "CARTWISE_API_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let session_token = match env.optional("CARTWISE_SESSION_TOKEN") {
            Some(token) => {
                validate_token(&token, "CARTWISE_SESSION_TOKEN")?;
                Some(SessionToken::new(token))
            }
            None => None,
        };

        let request_timeout =
            env.seconds("CARTWISE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let catalog_cache_ttl =
            env.seconds("CARTWISE_CATALOG_CACHE_TTL_SECS", DEFAULT_CATALOG_CACHE_TTL_SECS)?;
        let local_cart_path = PathBuf::from(
            env.optional("CARTWISE_LOCAL_CART_PATH")
                .unwrap_or_else(|| DEFAULT_LOCAL_CART_PATH.to_string()),
        );
        let sentry_dsn = env.optional("SENTRY_DSN");

        Ok(Self {
            api_url,
            session_token,
            request_timeout,
            catalog_cache_ttl,
            local_cart_path,
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a positive number of seconds with a default.
    fn seconds(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        let Some(raw) = self.optional(key) else {
            return Ok(Duration::from_secs(default));
        };
        let secs = raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        Ok(Duration::from_secs(secs))
    }
}

/// Validate that a token is not a placeholder.
fn validate_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = token.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if token.chars().any(char::is_whitespace) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "must not contain whitespace".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_api_url() {
        let config = load(&[("CARTWISE_API_URL", "https://api.cartwise.test")]).unwrap();

        assert_eq!(config.api_url.as_str(), "https://api.cartwise.test/");
        assert!(config.session_token.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.local_cart_path, PathBuf::from(".cartwise-cart.json"));
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CARTWISE_API_URL"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[("CARTWISE_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[("CARTWISE_API_URL", "mailto:someone@cartwise.test")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_timeout_parsing() {
        let config = load(&[
            ("CARTWISE_API_URL", "http://localhost:8080"),
            ("CARTWISE_REQUEST_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));

        let err = load(&[
            ("CARTWISE_API_URL", "http://localhost:8080"),
            ("CARTWISE_REQUEST_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[
            ("CARTWISE_API_URL", "http://localhost:8080"),
            ("CARTWISE_CATALOG_CACHE_TTL_SECS", "five"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_session_token_loaded() {
        let config = load(&[
            ("CARTWISE_API_URL", "http://localhost:8080"),
            ("CARTWISE_SESSION_TOKEN", "s3ss10n-9KfQ2"),
        ])
        .unwrap();
        assert!(config.session_token.is_some());
    }

    #[test]
    fn test_empty_session_token_means_local_mode() {
        let config = load(&[
            ("CARTWISE_API_URL", "http://localhost:8080"),
            ("CARTWISE_SESSION_TOKEN", "  "),
        ])
        .unwrap();
        assert!(config.session_token.is_none());
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = load(&[
            ("CARTWISE_API_URL", "http://localhost:8080"),
            ("CARTWISE_SESSION_TOKEN", "your-session-token"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_token_whitespace() {
        assert!(validate_token("abc def", "TEST_VAR").is_err());
        assert!(validate_token("abcdef", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = load(&[
            ("CARTWISE_API_URL", "http://localhost:8080"),
            ("CARTWISE_SESSION_TOKEN", "s3ss10n-9KfQ2"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("localhost"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("s3ss10n-9KfQ2"));
    }
}
