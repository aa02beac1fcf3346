//! OAuth client configuration with validation.
//!
//! Values come from code (`Default` + `with_*` builders) or from environment
//! variables via [`OAuthConfig::from_env`] and [`OAuthConfig::from_lookup`].

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Offending variable or field
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid timeout value
    #[error("Invalid timeout for {0}: must be greater than 0")]
    InvalidTimeout(String),

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// What to do when the OAuth service reports the token as not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Propagate the 404 to the caller.
    #[default]
    Reject,
    /// Let the request through unauthenticated.
    PassThrough,
}

/// OAuth service client configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Base address of the OAuth service
    pub base_url: Url,
    /// Total request timeout (default: 200ms)
    pub timeout: Duration,
    /// Connection timeout (default: 200ms)
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Handling of remote 404 responses
    pub not_found_policy: NotFoundPolicy,
}

const DEFAULT_BASE_URL: &str = "http://localhost:8181";
const DEFAULT_TIMEOUT_MS: u64 = 200;

impl Default for OAuthConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: "bookstore-oauth/0.1".to_string(),
            not_found_policy: NotFoundPolicy::Reject,
        }
    }
}

impl OAuthConfig {
    /// Loads configuration from environment variables with validation.
    ///
    /// Reads `OAUTH_BASE_URL`, `OAUTH_TIMEOUT_MS`, `OAUTH_CONNECT_TIMEOUT_MS`,
    /// `OAUTH_USER_AGENT` and `OAUTH_PASS_THROUGH_NOT_FOUND`. A `.env` file is
    /// loaded first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from `lookup`, which maps a variable name to its
    /// value. Same variables and defaults as [`OAuthConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let pass_through: bool = parse_var(&lookup, "OAUTH_PASS_THROUGH_NOT_FOUND", false)?;

        let config = Self {
            base_url: parse_url_var(&lookup, "OAUTH_BASE_URL", DEFAULT_BASE_URL)?,
            timeout: Duration::from_millis(parse_var(
                &lookup,
                "OAUTH_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
            )?),
            connect_timeout: Duration::from_millis(parse_var(
                &lookup,
                "OAUTH_CONNECT_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
            )?),
            user_agent: lookup("OAUTH_USER_AGENT").unwrap_or(defaults.user_agent),
            not_found_policy: if pass_through {
                NotFoundPolicy::PassThrough
            } else {
                NotFoundPolicy::Reject
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero timeout, a non-HTTP base URL, or a base
    /// URL carrying a query or fragment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("timeout".to_string()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("connect_timeout".to_string()));
        }
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                field: "base_url".to_string(),
                reason: format!("unsupported scheme {}", self.base_url.scheme()),
            });
        }
        if self.base_url.query().is_some() || self.base_url.fragment().is_some() {
            return Err(ConfigError::InvalidUrl {
                field: "base_url".to_string(),
                reason: "query and fragment are not allowed".to_string(),
            });
        }
        Ok(())
    }

    /// Set the OAuth service base address.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the not-found policy.
    #[must_use]
    pub const fn with_not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found_policy = policy;
        self
    }
}

/// Parse a variable with a default value.
fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a URL variable with a default value.
fn parse_url_var<F>(lookup: &F, name: &str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let url_str = lookup(name).unwrap_or_else(|| default.to_string());
    Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}
