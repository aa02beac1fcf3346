//! HTTP client building for the OAuth service.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::config::OAuthConfig;

/// Idle connections are kept this long between token lookups.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Build a reqwest client for the OAuth service.
///
/// The configured timeout bounds the whole call; no retries are made.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization fails).
pub fn build_http_client(config: &OAuthConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
}
