//! Helpers shared by the bookstore-oauth integration tests.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use bookstore_oauth::{
    HttpAccessTokenResolver, LogFormat, NotFoundPolicy, RequestAuthenticator, init_tracing,
};
use test_utils::fixtures::MockOAuthServer;

/// Build an HTTP-backed authenticator pointed at `server`.
///
/// # Panics
///
/// Panics if the authenticator cannot be built from the server config.
#[must_use]
#[allow(clippy::expect_used)]
pub fn authenticator_for(
    server: &MockOAuthServer,
    timeout: Duration,
    policy: NotFoundPolicy,
) -> Arc<RequestAuthenticator<HttpAccessTokenResolver>> {
    init_tracing(LogFormat::Test);
    let config = server
        .config()
        .with_timeout(timeout)
        .with_not_found_policy(policy);
    Arc::new(RequestAuthenticator::from_config(&config).expect("authenticator from mock config"))
}
