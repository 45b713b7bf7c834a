//! Wire payloads for the session and account backends

use serde::{Deserialize, Serialize};

/// Body POSTed to a session endpoint
///
/// Serializes to `{}` when no identity is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LaunchRequest {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn identity(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            token: Some(token.into()),
        }
    }
}

/// Body POSTed to `/login` and `/signup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Successful account response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub premium: bool,
    /// Identifier echo; the submitted identifier is used when absent
    #[serde(default)]
    pub username: Option<String>,
}

/// Failure body returned by the account backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
