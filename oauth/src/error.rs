//! Structured REST error shared with the OAuth service.
//!
//! The same type carries errors reported by the remote service and errors
//! raised locally when the remote call cannot be completed, so both reach
//! the host framework through a single path.

use std::fmt::Display;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structured REST error.
///
/// Wire format: `{"message": .., "status": .., "error": .., "causes": [..]}`.
/// `error` and `causes` are optional when decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (status {status})")]
pub struct RestError {
    /// Human readable message
    pub message: String,
    /// HTTP status code
    pub status: u16,
    /// Short error kind, e.g. `not_found`
    #[serde(default)]
    pub error: String,
    /// Underlying causes
    #[serde(default)]
    pub causes: Vec<Value>,
    /// Where the error was raised. Not part of the wire format.
    #[serde(skip)]
    origin: ErrorOrigin,
}

/// Where a [`RestError`] was raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Reported by the OAuth service, or built by the caller.
    #[default]
    Remote,
    /// Raised here because the remote call could not be completed.
    Local,
}

/// Classification of a [`RestError`] derived from its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 500
    Internal,
    /// Any other status
    Other(u16),
}

impl RestError {
    /// Create an error from all of its parts.
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        status: u16,
        error: impl Into<String>,
        causes: Vec<Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status,
            error: error.into(),
            causes,
            origin: ErrorOrigin::Remote,
        }
    }

    /// Create a 400 error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, 400, "bad_request", Vec::new())
    }

    /// Create a 401 error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, 401, "unauthorized", Vec::new())
    }

    /// Create a 404 error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, 404, "not_found", Vec::new())
    }

    /// Create a locally raised 500 error, recording `cause` when present.
    #[must_use]
    pub fn internal_server_error<E: Display>(message: impl Into<String>, cause: Option<E>) -> Self {
        let causes = cause
            .map(|c| vec![Value::String(c.to_string())])
            .unwrap_or_default();
        Self {
            origin: ErrorOrigin::Local,
            ..Self::new(message, 500, "internal_server_error", causes)
        }
    }

    /// Decode an error from its JSON representation. The result is always
    /// [`ErrorOrigin::Remote`].
    ///
    /// # Errors
    ///
    /// Returns the decode error if `bytes` is not a JSON object with at
    /// least `message` and `status`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Classify the error by status.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self.status {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            500 => ErrorKind::Internal,
            other => ErrorKind::Other(other),
        }
    }

    /// Where the error was raised.
    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        self.origin
    }

    /// Whether this error was raised locally rather than by the remote service.
    /// A 500 reported by the remote service is not internal.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.origin == ErrorOrigin::Local
    }

    /// HTTP status for the error. Anything that is not a 4xx or 5xx maps
    /// to 500, so an error never renders as a success.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match StatusCode::from_u16(self.status) {
            Ok(status) if status.is_client_error() || status.is_server_error() => status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as a JSON HTTP response.
    #[must_use]
    pub fn into_response<B: From<String>>(self) -> Response<B> {
        let status = self.status_code();
        let body = serde_json::to_string(&self).unwrap_or_else(|_| self.message.clone());

        let mut response = Response::new(B::from(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}
