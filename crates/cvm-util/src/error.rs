//! Error types for cvm-session

use thiserror::Error;

/// Error taxonomy for the session lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CvmError {
    /// Non-success HTTP status from either backend
    #[error("Remote error: {status} {status_text}")]
    Remote {
        status: u16,
        status_text: String,
        /// Backend-provided message, when the body carried one
        message: Option<String>,
    },

    /// Success response with a missing or malformed field
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Embedding layer failed to attach a live view
    #[error("SDK attach error: {0}")]
    SdkAttach(String),

    /// Invariant violation in configuration or selection state
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Credential store failure
    #[error("Store error: {0}")]
    Store(String),
}

impl CvmError {
    pub fn remote(status: u16, status_text: impl Into<String>) -> Self {
        Self::Remote {
            status,
            status_text: status_text.into(),
            message: None,
        }
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn sdk_attach(msg: impl Into<String>) -> Self {
        Self::SdkAttach(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Message suitable for showing to the user after a failed login or signup.
    ///
    /// Account errors are low sensitivity, so the backend's own wording is
    /// passed through when there is one.
    pub fn auth_message(&self) -> String {
        match self {
            Self::Remote {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Remote { .. } => "Unknown error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CvmError>;
