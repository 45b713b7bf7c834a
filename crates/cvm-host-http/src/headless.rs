//! Headless embedding SDK
//!
//! There is no page to render into when running from a terminal, so
//! attaching means probing the embed URL and reporting the outcome on the
//! diagnostic channel.

use async_trait::async_trait;
use cvm_host_api::{
    AttachOptions, ConnectionState, DisplaySurface, EmbedHandle, EmbedSdk, SdkEvent,
};
use cvm_util::{CvmError, Result, is_http_url};
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct HeadlessSdk {
    client: Client,
}

impl HeadlessSdk {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbedSdk for HeadlessSdk {
    async fn attach(
        &self,
        surface: &DisplaySurface,
        embed_url: &str,
        options: &AttachOptions,
    ) -> Result<EmbedHandle> {
        if !is_http_url(embed_url) {
            return Err(CvmError::sdk_attach(format!(
                "embed URL must be http(s): {embed_url}"
            )));
        }

        debug!(
            surface = %surface,
            allow = ?options.iframe_allow,
            "Probing embed URL"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(SdkEvent::ConnectionStateChanged {
            state: ConnectionState::Connecting,
        });

        let response = self
            .client
            .get(embed_url)
            .send()
            .await
            .map_err(|e| CvmError::sdk_attach(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CvmError::sdk_attach(format!("embed URL answered {status}")));
        }

        let _ = tx.send(SdkEvent::ConnectionStateChanged {
            state: ConnectionState::Playing,
        });
        info!(surface = %surface, "Remote view attached");

        Ok(EmbedHandle::new(embed_url, rx))
    }
}
