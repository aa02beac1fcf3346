//! Request authentication.
//!
//! [`RequestAuthenticator::authenticate_request`] strips identity headers a
//! caller may have forged, resolves the `access_token` query parameter with
//! the OAuth service and writes the resolved identity back into the
//! request headers.

use http::Request;
use tracing::{debug, instrument, warn};

use crate::client::{AccessTokenResolver, HttpAccessTokenResolver};
use crate::config::{ConfigError, NotFoundPolicy, OAuthConfig};
use crate::error::{ErrorKind, RestError};
use crate::request::{access_token_id, clean_request, set_identity};

/// Authenticates inbound requests against the OAuth service.
///
/// Holds no per-request state; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator<R = HttpAccessTokenResolver> {
    resolver: R,
    not_found_policy: NotFoundPolicy,
}

impl RequestAuthenticator<HttpAccessTokenResolver> {
    /// Build an authenticator talking to the OAuth service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &OAuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = HttpAccessTokenResolver::new(config)?;
        Ok(Self::new(resolver).with_not_found_policy(config.not_found_policy))
    }
}

impl<R: AccessTokenResolver> RequestAuthenticator<R> {
    /// Create an authenticator around `resolver` rejecting unknown tokens.
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            not_found_policy: NotFoundPolicy::Reject,
        }
    }

    /// Set how a remote "not found" answer is handled.
    #[must_use]
    pub fn with_not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found_policy = policy;
        self
    }

    /// Current not-found policy.
    #[must_use]
    pub const fn not_found_policy(&self) -> NotFoundPolicy {
        self.not_found_policy
    }

    /// The underlying resolver.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Authenticate `request` in place.
    ///
    /// `X-Client-Id` and `X-User-Id` are always removed first. Without an
    /// `access_token` query parameter the request is left unauthenticated
    /// and `Ok(())` is returned; otherwise the token is resolved and, on
    /// success, the identity headers are set.
    ///
    /// # Errors
    ///
    /// Returns the error reported by the OAuth service, or an internal error
    /// if the service could not be reached or understood. Headers stay
    /// cleared on error.
    #[instrument(skip_all)]
    pub async fn authenticate_request<B>(
        &self,
        request: Option<&mut Request<B>>,
    ) -> Result<(), RestError> {
        let Some(request) = request else {
            return Ok(());
        };

        clean_request(request);

        let Some(token_id) = access_token_id(request) else {
            debug!("no access token, request left unauthenticated");
            return Ok(());
        };

        let token = match self.resolver.get_access_token(&token_id).await {
            Ok(token) => token,
            Err(err)
                if err.kind() == ErrorKind::NotFound
                    && self.not_found_policy == NotFoundPolicy::PassThrough =>
            {
                debug!("access token not found, passing request through");
                return Ok(());
            }
            Err(err) => {
                warn!(status = err.status, error = %err, "access token resolution failed");
                return Err(err);
            }
        };

        set_identity(request, &token);
        debug!(
            user_id = token.user_id,
            client_id = token.client_id,
            "request authenticated"
        );
        Ok(())
    }
}
