//! End-to-end tests: request authentication against a mock OAuth service.

use std::convert::Infallible;
use std::time::Duration;

use bookstore_oauth::{
    AuthenticationLayer, ErrorKind, NotFoundPolicy, OAuthConfig, RequestAuthenticator, RestError,
    get_client_id, get_user_id, is_public,
};
use bookstore_oauth_integration_tests::authenticator_for;
use http::{Request, Response, StatusCode};
use proptest::prelude::*;
use test_utils::fixtures::{MockOAuthServer, forged_request, not_found_body, request, sample_token};
use test_utils::mocks::MockAccessTokenResolver;
use test_utils::{access_token_strategy, remote_error_strategy};
use tower::{Layer, ServiceExt, service_fn};

const TIMEOUT: Duration = Duration::from_millis(200);

// ── Successful resolution ───────────────────────────────────────────

#[tokio::test]
async fn valid_token_sets_identity_headers() {
    let server = MockOAuthServer::start().await;
    server.mount_token(&sample_token()).await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    let mut req = forged_request("TOK123");
    auth.authenticate_request(Some(&mut req)).await.unwrap();

    assert_eq!(get_user_id(Some(&req)), 7);
    assert_eq!(get_client_id(Some(&req)), 99);
    assert_eq!(server.request_count().await, 1);
}

#[tokio::test]
async fn repeated_authentication_is_idempotent() {
    let server = MockOAuthServer::start().await;
    server.mount_token(&sample_token()).await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    let mut req = forged_request("TOK123");
    auth.authenticate_request(Some(&mut req)).await.unwrap();
    let first = req.headers().clone();
    auth.authenticate_request(Some(&mut req)).await.unwrap();

    assert_eq!(req.headers(), &first);
    assert_eq!(server.request_count().await, 2);
}

// ── No-op paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_clears_forged_identity() {
    let server = MockOAuthServer::start().await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    let mut req = request("/items/1", &[("X-User-Id", "1"), ("X-Client-Id", "1")]);
    auth.authenticate_request(Some(&mut req)).await.unwrap();

    assert_eq!(get_user_id(Some(&req)), 0);
    assert_eq!(get_client_id(Some(&req)), 0);
    assert!(req.headers().get("x-user-id").is_none());
    assert_eq!(server.request_count().await, 0);
}

#[tokio::test]
async fn absent_request_is_noop() {
    let server = MockOAuthServer::start().await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    assert!(auth.authenticate_request::<()>(None).await.is_ok());
    assert_eq!(server.request_count().await, 0);
}

// ── Remote errors ───────────────────────────────────────────────────

#[tokio::test]
async fn remote_not_found_propagated_verbatim() {
    let server = MockOAuthServer::start().await;
    server.mount_json("BAD", 404, not_found_body()).await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    let mut req = forged_request("BAD");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();

    assert_eq!(err, RestError::new("token not found", 404, "", vec![]));
    assert_eq!(get_user_id(Some(&req)), 0);
    assert_eq!(get_client_id(Some(&req)), 0);
}

#[tokio::test]
async fn remote_not_found_passes_through_when_configured() {
    let server = MockOAuthServer::start().await;
    server.mount_json("BAD", 404, not_found_body()).await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::PassThrough);

    let mut req = forged_request("BAD");
    auth.authenticate_request(Some(&mut req)).await.unwrap();
    assert_eq!(get_user_id(Some(&req)), 0);
}

#[tokio::test]
async fn remote_unauthorized_not_passed_through() {
    let server = MockOAuthServer::start().await;
    server
        .mount_error("EXPIRED", &RestError::unauthorized("token expired"))
        .await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::PassThrough);

    let mut req = forged_request("EXPIRED");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.error, "unauthorized");
}

#[tokio::test]
async fn remote_server_error_is_not_local() {
    let server = MockOAuthServer::start().await;
    server
        .mount_json("DOWN", 500, serde_json::json!({"status": 500, "message": "db down"}))
        .await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    let mut req = forged_request("DOWN");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.message, "db down");
    assert!(!err.is_internal());
}

#[tokio::test]
async fn malformed_remote_error_is_internal() {
    let server = MockOAuthServer::start().await;
    server.mount_raw("BAD", 502, "<html>bad gateway</html>").await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    let mut req = forged_request("BAD");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.message, "Access token error, interface error");
}

#[tokio::test]
async fn malformed_success_body_is_internal() {
    let server = MockOAuthServer::start().await;
    server
        .mount_json("TOK123", 200, serde_json::json!({ "id": "TOK123" }))
        .await;
    let auth = authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject);

    let mut req = forged_request("TOK123");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.message, "Access token error, can not process response");
    assert_eq!(get_user_id(Some(&req)), 0);
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn slow_service_times_out_as_internal_error() {
    let server = MockOAuthServer::start().await;
    server
        .mount_delayed_token(&sample_token(), Duration::from_millis(500))
        .await;
    let auth = authenticator_for(&server, Duration::from_millis(50), NotFoundPolicy::Reject);

    let mut req = forged_request("TOK123");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.message, "Access token error, invalid rest response");
    assert_eq!(get_user_id(Some(&req)), 0);
}

#[tokio::test]
async fn unreachable_service_is_internal_error() {
    let config = OAuthConfig::default().with_base_url("http://127.0.0.1:9".parse().unwrap());
    let auth = RequestAuthenticator::from_config(&config).unwrap();

    let mut req = forged_request("TOK123");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.causes.len(), 1);
    assert_eq!(get_client_id(Some(&req)), 0);
}

// ── Tower middleware ────────────────────────────────────────────────

async fn identity_handler(req: Request<()>) -> Result<Response<String>, Infallible> {
    let body = format!(
        "{}:{}:{}",
        get_user_id(Some(&req)),
        get_client_id(Some(&req)),
        is_public(Some(&req))
    );
    Ok(Response::new(body))
}

#[tokio::test]
async fn middleware_forwards_authenticated_request() {
    let server = MockOAuthServer::start().await;
    server.mount_token(&sample_token()).await;
    let layer = AuthenticationLayer::new(authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject));

    let svc = layer.layer(service_fn(identity_handler));
    let response = svc.oneshot(forged_request("TOK123")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "7:99:false");
}

#[tokio::test]
async fn middleware_rejects_with_remote_status() {
    let server = MockOAuthServer::start().await;
    server.mount_json("BAD", 404, not_found_body()).await;
    let layer = AuthenticationLayer::new(authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject));

    let svc = layer.layer(service_fn(identity_handler));
    let response = svc.oneshot(forged_request("BAD")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err = RestError::from_bytes(response.body().as_bytes()).unwrap();
    assert_eq!(err.message, "token not found");
}

#[tokio::test]
async fn middleware_never_renders_remote_error_as_success() {
    let server = MockOAuthServer::start().await;
    server
        .mount_json("ODD", 404, serde_json::json!({"status": 200, "message": "ok?"}))
        .await;
    let layer = AuthenticationLayer::new(authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject));

    let svc = layer.layer(service_fn(identity_handler));
    let response = svc.oneshot(forged_request("ODD")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err = RestError::from_bytes(response.body().as_bytes()).unwrap();
    assert_eq!(err.status, 200);
    assert_eq!(err.message, "ok?");
}

#[tokio::test]
async fn middleware_leaves_public_flag_to_handlers() {
    let server = MockOAuthServer::start().await;
    let layer = AuthenticationLayer::new(authenticator_for(&server, TIMEOUT, NotFoundPolicy::Reject));

    let svc = layer.layer(service_fn(identity_handler));
    let response = svc
        .oneshot(request("/items", &[("X-Public", "true"), ("X-User-Id", "5")]))
        .await
        .unwrap();

    assert_eq!(response.body(), "0:0:true");
}

// ── Mock resolver ───────────────────────────────────────────────────

#[tokio::test]
async fn mock_resolver_records_lookups() {
    let resolver = MockAccessTokenResolver::new();
    resolver.insert(sample_token()).await;
    let auth = RequestAuthenticator::new(resolver.clone());

    let mut req = forged_request("TOK123");
    auth.authenticate_request(Some(&mut req)).await.unwrap();
    let mut req = forged_request("OTHER");
    let err = auth.authenticate_request(Some(&mut req)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(resolver.calls().await, vec!["TOK123", "OTHER"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_any_resolved_token_lands_in_headers(token in access_token_strategy()) {
        let resolver = MockAccessTokenResolver::new();
        let auth = RequestAuthenticator::new(resolver.clone());
        let mut req = forged_request(&token.id);

        let result = tokio_test::block_on(async {
            resolver.insert(token.clone()).await;
            auth.authenticate_request(Some(&mut req)).await
        });

        prop_assert!(result.is_ok());
        prop_assert_eq!(get_user_id(Some(&req)), token.user_id);
        prop_assert_eq!(get_client_id(Some(&req)), token.client_id);
    }

    #[test]
    fn prop_remote_errors_leave_headers_cleared(error in remote_error_strategy()) {
        let resolver = MockAccessTokenResolver::new();
        let auth = RequestAuthenticator::new(resolver.clone());
        let mut req = forged_request("TOK123");

        let result = tokio_test::block_on(async {
            resolver.fail_with(error.clone()).await;
            auth.authenticate_request(Some(&mut req)).await
        });

        prop_assert_eq!(result, Err(error));
        prop_assert_eq!(get_user_id(Some(&req)), 0);
        prop_assert_eq!(get_client_id(Some(&req)), 0);
    }
}
