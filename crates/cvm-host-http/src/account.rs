//! Account backend client

use async_trait::async_trait;
use cvm_api::{AuthMode, AuthRequest, AuthResponse, ErrorBody};
use cvm_host_api::AccountBackend;
use cvm_util::{CvmError, Result, join_url};
use reqwest::Client;
use tracing::debug;

use crate::remote_error;

/// Talks to `<base>/login` and `<base>/signup`
#[derive(Clone)]
pub struct HttpAccountBackend {
    client: Client,
    base_url: String,
}

impl HttpAccountBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AccountBackend for HttpAccountBackend {
    async fn authenticate(&self, mode: AuthMode, request: &AuthRequest) -> Result<AuthResponse> {
        let url = join_url(&self.base_url, mode.path());
        debug!(url = %url, mode = ?mode, username = %request.username, "Submitting credentials");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| CvmError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CvmError::transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|b| b.error);
            return Err(remote_error(status, message));
        }

        serde_json::from_str::<AuthResponse>(&body)
            .map_err(|e| CvmError::protocol(format!("malformed account response: {e}")))
    }
}
