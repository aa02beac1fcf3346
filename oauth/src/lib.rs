//! Access token resolution for bookstore HTTP services.
//!
//! This crate provides:
//! - Identity header accessors (`X-User-Id`, `X-Client-Id`, `X-Public`)
//! - A request authenticator that exchanges the `access_token` query
//!   parameter for identity claims via the remote OAuth service
//! - The structured REST error shared with the OAuth service
//! - A Tower layer running authentication in front of any HTTP service
//! - Configuration, HTTP client building and tracing setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authenticator;
pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod middleware;
pub mod request;
pub mod token;
pub mod tracing_config;

pub use authenticator::RequestAuthenticator;
pub use client::{AccessTokenResolver, HttpAccessTokenResolver, decode_access_token_response};
pub use config::{ConfigError, NotFoundPolicy, OAuthConfig};
pub use error::{ErrorKind, ErrorOrigin, RestError};
pub use http_client::build_http_client;
pub use middleware::{AuthenticationLayer, AuthenticationService};
pub use request::{get_client_id, get_user_id, is_public};
pub use token::AccessToken;
pub use tracing_config::{LogFormat, init_tracing};

/// Header flagging a request as not requiring authentication.
pub const HEADER_X_PUBLIC: &str = "x-public";
/// Header carrying the resolved client id.
pub const HEADER_X_CLIENT_ID: &str = "x-client-id";
/// Header carrying the resolved user id.
pub const HEADER_X_USER_ID: &str = "x-user-id";
/// Query parameter carrying the access token id.
pub const PARAM_ACCESS_TOKEN: &str = "access_token";
