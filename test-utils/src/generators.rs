//! Shared proptest generators.

use bookstore_oauth::{AccessToken, RestError};
use proptest::prelude::*;

/// Generate opaque access token ids as issued by the OAuth service.
pub fn token_id_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{8,40}"
}

/// Generate resolved access tokens.
pub fn access_token_strategy() -> impl Strategy<Value = AccessToken> {
    (token_id_strategy(), any::<i64>(), any::<i64>()).prop_map(|(id, user_id, client_id)| {
        AccessToken {
            id,
            user_id,
            client_id,
        }
    })
}

/// Generate error kinds the OAuth service reports.
pub fn remote_error_strategy() -> impl Strategy<Value = RestError> {
    let status = prop_oneof![
        Just(400u16),
        Just(401u16),
        Just(403u16),
        Just(404u16),
        Just(500u16),
        Just(503u16),
    ];
    (status, "[a-zA-Z ]{1,40}").prop_map(|(status, message)| {
        let kind = match status {
            400 => "bad_request",
            401 => "unauthorized",
            403 => "forbidden",
            404 => "not_found",
            503 => "service_unavailable",
            _ => "internal_server_error",
        };
        RestError::new(message, status, kind, vec![])
    })
}
