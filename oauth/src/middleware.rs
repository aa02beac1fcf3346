//! Authentication Tower Layer
//!
//! Runs [`RequestAuthenticator::authenticate_request`] before the wrapped
//! service. Failed authentication short-circuits with the error rendered as
//! a JSON response; the inner service is not called.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{Request, Response};
use tower::{Layer, Service};

use crate::authenticator::RequestAuthenticator;
use crate::client::{AccessTokenResolver, HttpAccessTokenResolver};

/// Authentication layer for Tower
pub struct AuthenticationLayer<R = HttpAccessTokenResolver> {
    authenticator: Arc<RequestAuthenticator<R>>,
}

impl<R> AuthenticationLayer<R> {
    /// Creates a new authentication layer
    pub fn new(authenticator: Arc<RequestAuthenticator<R>>) -> Self {
        Self { authenticator }
    }
}

impl<R> Clone for AuthenticationLayer<R> {
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

impl<S, R> Layer<S> for AuthenticationLayer<R> {
    type Service = AuthenticationService<S, R>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthenticationService {
            inner,
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

/// Authentication service wrapper
pub struct AuthenticationService<S, R = HttpAccessTokenResolver> {
    inner: S,
    authenticator: Arc<RequestAuthenticator<R>>,
}

impl<S: Clone, R> Clone for AuthenticationService<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

impl<S, R, ReqBody, ResBody> Service<Request<ReqBody>> for AuthenticationService<S, R>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
    R: AccessTokenResolver + 'static,
    ReqBody: Send + 'static,
    ResBody: From<String> + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let authenticator = Arc::clone(&self.authenticator);
        // Take the service that was polled ready, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            if let Err(err) = authenticator.authenticate_request(Some(&mut req)).await {
                return Ok(err.into_response());
            }
            inner.call(req).await
        })
    }
}
