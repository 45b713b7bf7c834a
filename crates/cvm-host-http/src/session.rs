//! Session backend client

use async_trait::async_trait;
use cvm_api::LaunchRequest;
use cvm_host_api::SessionBackend;
use cvm_util::{CvmError, Result};
use reqwest::Client;
use tracing::debug;

use crate::remote_error;

/// Requests sessions from endpoint URLs over HTTP
#[derive(Clone)]
pub struct HttpSessionBackend {
    client: Client,
}

impl HttpSessionBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionBackend for HttpSessionBackend {
    async fn request_session(
        &self,
        url: &str,
        request: &LaunchRequest,
    ) -> Result<serde_json::Value> {
        debug!(url = %url, "Requesting session");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| CvmError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_error(status, None));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| CvmError::protocol(format!("response body is not JSON: {e}")))?;

        debug!(url = %url, status = %status, "Session response received");
        Ok(body)
    }
}
