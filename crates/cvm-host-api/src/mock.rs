//! Mock collaborators for testing

use async_trait::async_trait;
use cvm_api::{AuthMode, AuthRequest, AuthResponse, LaunchRequest};
use cvm_util::{CvmError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::{
    AccountBackend, AttachOptions, DisplaySurface, EmbedHandle, EmbedSdk, SdkEvent, SessionBackend,
};

/// Session backend returning scripted responses
pub struct MockSessionBackend {
    responses: Mutex<VecDeque<Result<serde_json::Value>>>,
    fallback: Mutex<Result<serde_json::Value>>,
    calls: Mutex<Vec<(String, LaunchRequest)>>,
}

impl MockSessionBackend {
    /// Every request answers with `body`
    pub fn responding(body: serde_json::Value) -> Self {
        Self::with_fallback(Ok(body))
    }

    /// Every request fails with `error`
    pub fn failing(error: CvmError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: Result<serde_json::Value>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a one-shot response ahead of the fallback
    pub fn push_response(&self, response: Result<serde_json::Value>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<(String, LaunchRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionBackend for MockSessionBackend {
    async fn request_session(
        &self,
        url: &str,
        request: &LaunchRequest,
    ) -> Result<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), request.clone()));

        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return response;
        }
        self.fallback.lock().unwrap().clone()
    }
}

/// Account backend returning a scripted result
pub struct MockAccountBackend {
    result: Mutex<Result<AuthResponse>>,
    calls: Mutex<Vec<(AuthMode, AuthRequest)>>,
}

impl MockAccountBackend {
    pub fn granting(token: impl Into<String>, premium: bool) -> Self {
        Self {
            result: Mutex::new(Ok(AuthResponse {
                token: token.into(),
                premium,
                username: None,
            })),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(status: u16, message: impl Into<String>) -> Self {
        Self {
            result: Mutex::new(Err(CvmError::Remote {
                status,
                status_text: String::new(),
                message: Some(message.into()),
            })),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_result(&self, result: Result<AuthResponse>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<(AuthMode, AuthRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountBackend for MockAccountBackend {
    async fn authenticate(&self, mode: AuthMode, request: &AuthRequest) -> Result<AuthResponse> {
        self.calls.lock().unwrap().push((mode, request.clone()));
        self.result.lock().unwrap().clone()
    }
}

/// Embedding SDK that records attachments
pub struct MockSdk {
    /// Configure attach to fail
    pub fail_attach: Mutex<bool>,
    attached: Mutex<Vec<(DisplaySurface, String, AttachOptions)>>,
    senders: Mutex<Vec<mpsc::UnboundedSender<SdkEvent>>>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self {
            fail_attach: Mutex::new(false),
            attached: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let sdk = Self::new();
        *sdk.fail_attach.lock().unwrap() = true;
        sdk
    }

    /// Embed URLs attached so far, in order
    pub fn attached_urls(&self) -> Vec<String> {
        self.attached
            .lock()
            .unwrap()
            .iter()
            .map(|(_, url, _)| url.clone())
            .collect()
    }

    pub fn attachments(&self) -> Vec<(DisplaySurface, String, AttachOptions)> {
        self.attached.lock().unwrap().clone()
    }

    /// Simulate a diagnostic event on every live view
    pub fn emit(&self, event: SdkEvent) {
        for tx in self.senders.lock().unwrap().iter() {
            let _ = tx.send(event.clone());
        }
    }
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbedSdk for MockSdk {
    async fn attach(
        &self,
        surface: &DisplaySurface,
        embed_url: &str,
        options: &AttachOptions,
    ) -> Result<EmbedHandle> {
        if *self.fail_attach.lock().unwrap() {
            return Err(CvmError::sdk_attach("Mock attach failure"));
        }

        self.attached
            .lock()
            .unwrap()
            .push((surface.clone(), embed_url.to_string(), options.clone()));

        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        Ok(EmbedHandle::new(embed_url, rx))
    }
}
