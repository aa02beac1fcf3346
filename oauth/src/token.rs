//! Access token returned by the OAuth service.

use serde::{Deserialize, Serialize};

/// Identity resolved for an access token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Access token id as submitted by the caller
    pub id: String,
    /// Authenticated user
    pub user_id: i64,
    /// Calling application
    pub client_id: i64,
}
