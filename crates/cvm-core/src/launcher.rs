//! Session launch: request a descriptor, validate it, attach the live view

use cvm_api::{Credential, Endpoint, GUEST_USERNAME, LaunchRequest, SessionDescriptor};
use cvm_config::{LaunchStrategy, RequestPayload, SessionSettings};
use cvm_host_api::{AttachOptions, DisplaySurface, EmbedHandle, EmbedSdk, SdkEvent, SessionBackend};
use cvm_util::{CvmError, RemoteSessionId, Result, VisitId, is_http_url};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

const EMBED_URL_FIELD: &str = "embed_url";
const SESSION_ID_FIELD: &str = "sessionId";

/// How a launch is shaped on the wire and attached
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub strategy: LaunchStrategy,
    pub payload: RequestPayload,
    pub surface: DisplaySurface,
    pub options: AttachOptions,
}

impl LaunchConfig {
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            strategy: settings.launch_strategy,
            payload: settings.request_payload,
            surface: DisplaySurface::new(settings.display_surface.clone()),
            options: AttachOptions {
                iframe_allow: settings.iframe_allow.clone(),
            },
        }
    }
}

/// A launched session: the descriptor plus its live view
#[derive(Debug)]
pub struct LaunchedSession {
    pub descriptor: SessionDescriptor,
    pub handle: EmbedHandle,
}

/// Requests a session from an endpoint and attaches the embedding client
///
/// Does not serialize launches itself; the controller allows one at a time.
pub struct SessionLauncher {
    backend: Arc<dyn SessionBackend>,
    sdk: Arc<dyn EmbedSdk>,
    config: LaunchConfig,
}

impl SessionLauncher {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        sdk: Arc<dyn EmbedSdk>,
        config: LaunchConfig,
    ) -> Self {
        Self {
            backend,
            sdk,
            config,
        }
    }

    /// Launch one session. No retries.
    pub async fn launch(
        &self,
        endpoint: &Endpoint,
        credential: &Credential,
    ) -> Result<LaunchedSession> {
        let request = build_request(self.config.payload, credential);
        debug!(endpoint = %endpoint.url, payload = ?self.config.payload, "Requesting session");

        let body = self.backend.request_session(&endpoint.url, &request).await?;
        let issued = parse_launch_response(&body)?;
        let embed_url = embed_locator(self.config.strategy, &endpoint.url, &issued)?;

        let handle = self
            .sdk
            .attach(&self.config.surface, &embed_url, &self.config.options)
            .await?;

        info!(
            endpoint = %endpoint.url,
            embed_url = %handle.embed_url(),
            session_id = ?issued.session_id.as_ref().map(RemoteSessionId::as_str),
            "Session attached"
        );

        Ok(LaunchedSession {
            descriptor: SessionDescriptor {
                embed_url,
                session_id: issued.session_id,
            },
            handle,
        })
    }
}

/// Payload for the session request
pub fn build_request(payload: RequestPayload, credential: &Credential) -> LaunchRequest {
    match payload {
        RequestPayload::Empty => LaunchRequest::empty(),
        RequestPayload::Identity => {
            let username = if credential.identifier.is_empty() {
                GUEST_USERNAME
            } else {
                credential.identifier.as_str()
            };
            LaunchRequest::identity(username, credential.auth_token.as_deref().unwrap_or(""))
        }
    }
}

/// Validate a session backend response body
///
/// `embed_url` must be a string with an http(s) scheme.
pub fn parse_launch_response(body: &serde_json::Value) -> Result<SessionDescriptor> {
    let embed_url = body
        .get(EMBED_URL_FIELD)
        .and_then(serde_json::Value::as_str)
        .filter(|url| is_http_url(url))
        .ok_or_else(|| CvmError::protocol("missing or malformed embed locator"))?;

    let session_id = body
        .get(SESSION_ID_FIELD)
        .and_then(serde_json::Value::as_str)
        .filter(|id| !id.is_empty())
        .map(RemoteSessionId::from);

    Ok(SessionDescriptor {
        embed_url: embed_url.to_string(),
        session_id,
    })
}

/// Locator handed to the SDK
pub fn embed_locator(
    strategy: LaunchStrategy,
    endpoint_url: &str,
    issued: &SessionDescriptor,
) -> Result<String> {
    match strategy {
        LaunchStrategy::Direct => Ok(issued.embed_url.clone()),
        LaunchStrategy::EndpointRelative => {
            let session_id = issued
                .session_id
                .as_ref()
                .ok_or_else(|| CvmError::protocol("missing sessionId for endpoint-relative launch"))?;
            let embed = Url::parse(&issued.embed_url)
                .map_err(|e| CvmError::protocol(format!("malformed embed locator: {}", e)))?;

            let mut locator = format!(
                "{}/vm/{}",
                endpoint_url.trim_end_matches('/'),
                session_id.as_str()
            );
            if let Some(query) = embed.query() {
                locator.push('?');
                locator.push_str(query);
            }

            Url::parse(&locator)
                .map_err(|e| CvmError::protocol(format!("malformed endpoint locator: {}", e)))?;
            Ok(locator)
        }
    }
}

/// Log SDK notifications until the stream closes
pub fn spawn_sdk_diagnostics(
    visit: VisitId,
    mut events: mpsc::UnboundedReceiver<SdkEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SdkEvent::ConnectionStateChanged { state } => {
                    info!(visit = %visit, state = ?state, "Live view connection state");
                }
                SdkEvent::Error { message } => {
                    warn!(visit = %visit, error = %message, "Live view reported an error");
                }
                SdkEvent::Disconnected { reason } => {
                    warn!(visit = %visit, reason = %reason, "Live view disconnected");
                }
            }
        }
        debug!(visit = %visit, "Live view diagnostics closed");
    })
}
