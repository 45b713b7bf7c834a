//! HTTP collaborators for cvm-session
//!
//! Provides:
//! - Session backend client (POST to the selected endpoint)
//! - Account backend client (`/login`, `/signup`)
//! - A headless embedding SDK that probes the embed URL instead of rendering it

mod account;
mod headless;
mod session;

pub use account::*;
pub use headless::*;
pub use session::*;

use cvm_util::{CvmError, Result};
use std::time::Duration;

/// Default timeout for backend requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build the shared HTTP client
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| CvmError::config(format!("failed to create HTTP client: {e}")))
}

/// Map a non-success response to `CvmError::Remote`
fn remote_error(status: reqwest::StatusCode, message: Option<String>) -> CvmError {
    CvmError::Remote {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        message,
    }
}
