//! Remote access token resolution.
//!
//! [`HttpAccessTokenResolver`] calls `GET /oauth/access_token` on the OAuth
//! service. Response decoding lives in [`decode_access_token_response`] so
//! the status/body contract can be exercised without a server.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{ConfigError, OAuthConfig};
use crate::error::RestError;
use crate::http_client::build_http_client;
use crate::token::AccessToken;

const ACCESS_TOKEN_SEGMENTS: [&str; 2] = ["oauth", "access_token"];
const PARAM_ACCESS_TOKEN_ID: &str = "access_token_id";

const MSG_INVALID_RESPONSE: &str = "Access token error, invalid rest response";
const MSG_INTERFACE_ERROR: &str = "Access token error, interface error";
const MSG_CANNOT_PROCESS: &str = "Access token error, can not process response";

/// Resolves access token ids into identities.
#[async_trait]
pub trait AccessTokenResolver: Send + Sync {
    /// Look up the access token with the given id.
    ///
    /// Errors reported by the OAuth service are returned unchanged; failures
    /// to reach it or to decode its answer are internal errors.
    async fn get_access_token(&self, access_token_id: &str) -> Result<AccessToken, RestError>;
}

#[async_trait]
impl<T: AccessTokenResolver + ?Sized> AccessTokenResolver for Arc<T> {
    async fn get_access_token(&self, access_token_id: &str) -> Result<AccessToken, RestError> {
        (**self).get_access_token(access_token_id).await
    }
}

/// Access token resolver backed by the OAuth service's REST API.
#[derive(Debug, Clone)]
pub struct HttpAccessTokenResolver {
    client: Client,
    endpoint: Url,
}

impl HttpAccessTokenResolver {
    /// Build a resolver from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &OAuthConfig) -> Result<Self, ConfigError> {
        let client = build_http_client(config)?;
        Self::with_client(client, &config.base_url)
    }

    /// Build a resolver around an existing client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot carry a path.
    pub fn with_client(client: Client, base_url: &Url) -> Result<Self, ConfigError> {
        let mut endpoint = base_url.clone();
        endpoint.set_query(None);
        endpoint.set_fragment(None);
        endpoint
            .path_segments_mut()
            .map_err(|()| ConfigError::InvalidUrl {
                field: "base_url".to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(ACCESS_TOKEN_SEGMENTS);

        Ok(Self { client, endpoint })
    }

    /// Full URL of the access token endpoint, without query.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AccessTokenResolver for HttpAccessTokenResolver {
    #[instrument(skip_all, fields(token_len = access_token_id.len()))]
    async fn get_access_token(&self, access_token_id: &str) -> Result<AccessToken, RestError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[(PARAM_ACCESS_TOKEN_ID, access_token_id)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "OAuth service call failed");
                RestError::internal_server_error(MSG_INVALID_RESPONSE, Some(e))
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, status, "OAuth service response body unreadable");
            RestError::internal_server_error(MSG_INVALID_RESPONSE, Some(e))
        })?;

        debug!(status, "OAuth service responded");
        decode_access_token_response(status, &body)
    }
}

/// Decode an OAuth service answer.
///
/// Statuses above 299 carry a [`RestError`] which is returned as is; any
/// other status carries an [`AccessToken`].
///
/// # Errors
///
/// Returns the remote error, or an internal error if the body cannot be
/// decoded as the payload its status implies.
pub fn decode_access_token_response(status: u16, body: &[u8]) -> Result<AccessToken, RestError> {
    if status > 299 {
        let remote = RestError::from_bytes(body)
            .map_err(|e| RestError::internal_server_error(MSG_INTERFACE_ERROR, Some(e)))?;
        return Err(remote);
    }

    serde_json::from_slice(body)
        .map_err(|e| RestError::internal_server_error(MSG_CANNOT_PROCESS, Some(e)))
}
