//! Test fixtures with sample data.
//!
//! Includes [`MockOAuthServer`], a wiremock server speaking the OAuth
//! service's access token API.

use std::time::Duration;

use bookstore_oauth::{AccessToken, OAuthConfig, RestError};
use http::Request;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the access token endpoint.
pub const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";

/// Sample access token `TOK123` for user 7 and client 99.
#[must_use]
pub fn sample_token() -> AccessToken {
    AccessToken {
        id: "TOK123".to_string(),
        user_id: 7,
        client_id: 99,
    }
}

/// Error body the OAuth service returns for an unknown token.
#[must_use]
pub fn not_found_body() -> Value {
    json!({ "status": 404, "message": "token not found" })
}

/// Build a GET request for `uri` with the given headers.
///
/// # Panics
///
/// Panics if `uri` or a header is invalid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn request(uri: &str, headers: &[(&str, &str)]) -> Request<()> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).expect("valid test request")
}

/// Request for `/items/1` carrying `access_token` and forged identity headers.
#[must_use]
pub fn forged_request(access_token: &str) -> Request<()> {
    request(
        &format!("/items/1?access_token={access_token}"),
        &[("X-User-Id", "1"), ("X-Client-Id", "1")],
    )
}

/// Wiremock server standing in for the OAuth service.
pub struct MockOAuthServer {
    server: MockServer,
}

impl MockOAuthServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URI of the mock server.
    #[must_use]
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the server URI is not a valid URL.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> OAuthConfig {
        OAuthConfig::default().with_base_url(self.uri().parse().expect("mock server URI"))
    }

    /// Answer lookups of `token.id` with `token`.
    pub async fn mount_token(&self, token: &AccessToken) {
        self.mount_json(&token.id, 200, json!(token)).await;
    }

    /// Answer lookups of `token_id` with `error`.
    pub async fn mount_error(&self, token_id: &str, error: &RestError) {
        self.mount_json(token_id, error.status, json!(error)).await;
    }

    /// Answer lookups of `token_id` with a JSON body.
    pub async fn mount_json(&self, token_id: &str, status: u16, body: Value) {
        self.mount(token_id, ResponseTemplate::new(status).set_body_json(body))
            .await;
    }

    /// Answer lookups of `token_id` with a raw body.
    pub async fn mount_raw(&self, token_id: &str, status: u16, body: &str) {
        self.mount(
            token_id,
            ResponseTemplate::new(status).set_body_string(body.to_string()),
        )
        .await;
    }

    /// Answer lookups of `token.id` with `token`, after `delay`.
    pub async fn mount_delayed_token(&self, token: &AccessToken, delay: Duration) {
        self.mount(
            &token.id,
            ResponseTemplate::new(200)
                .set_body_json(json!(token))
                .set_delay(delay),
        )
        .await;
    }

    async fn mount(&self, token_id: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(ACCESS_TOKEN_PATH))
            .and(query_param("access_token_id", token_id))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server received.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}
