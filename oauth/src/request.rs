//! Identity header accessors and mutation.
//!
//! The accessors never fail: a missing request or an unparsable header is
//! reported as "not public" / id `0`.

use http::{HeaderValue, Request};

use crate::token::AccessToken;
use crate::{HEADER_X_CLIENT_ID, HEADER_X_PUBLIC, HEADER_X_USER_ID, PARAM_ACCESS_TOKEN};

/// Whether the request is flagged public (`X-Public: true`).
///
/// An absent request counts as public.
#[must_use]
pub fn is_public<B>(request: Option<&Request<B>>) -> bool {
    request.is_none_or(|req| {
        req.headers()
            .get(HEADER_X_PUBLIC)
            .is_some_and(|v| v.as_bytes() == b"true")
    })
}

/// The authenticated user id, or `0` if unknown.
#[must_use]
pub fn get_user_id<B>(request: Option<&Request<B>>) -> i64 {
    request.map_or(0, |req| header_i64(req, HEADER_X_USER_ID))
}

/// The authenticated client id, or `0` if unknown.
#[must_use]
pub fn get_client_id<B>(request: Option<&Request<B>>) -> i64 {
    request.map_or(0, |req| header_i64(req, HEADER_X_CLIENT_ID))
}

fn header_i64<B>(request: &Request<B>, name: &str) -> i64 {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// The first non-empty `access_token` query parameter.
#[must_use]
pub fn access_token_id<B>(request: &Request<B>) -> Option<String> {
    let query = request.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == PARAM_ACCESS_TOKEN)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Remove every identity header value from the request.
pub fn clean_request<B>(request: &mut Request<B>) {
    let headers = request.headers_mut();
    headers.remove(HEADER_X_CLIENT_ID);
    headers.remove(HEADER_X_USER_ID);
}

/// Write the resolved identity into the request headers.
pub fn set_identity<B>(request: &mut Request<B>, token: &AccessToken) {
    let headers = request.headers_mut();
    headers.insert(HEADER_X_CLIENT_ID, HeaderValue::from(token.client_id));
    headers.insert(HEADER_X_USER_ID, HeaderValue::from(token.user_id));
}
