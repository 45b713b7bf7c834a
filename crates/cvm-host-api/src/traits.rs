//! Collaborator traits

use async_trait::async_trait;
use cvm_api::{AuthMode, AuthRequest, AuthResponse, LaunchRequest};
use cvm_util::Result;

use crate::{AttachOptions, DisplaySurface, EmbedHandle};

/// Session-issuing backend
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// POST `request` to `url` and return the JSON body of a success response.
    ///
    /// Non-success statuses map to `CvmError::Remote`; bodies that are not
    /// JSON map to `CvmError::Protocol`. Field validation is the caller's job.
    async fn request_session(
        &self,
        url: &str,
        request: &LaunchRequest,
    ) -> Result<serde_json::Value>;
}

/// Account backend serving `/login` and `/signup`
#[async_trait]
pub trait AccountBackend: Send + Sync {
    /// Submit credentials. Failures carry the backend's `error` text in
    /// `CvmError::Remote::message` when it sent one.
    async fn authenticate(&self, mode: AuthMode, request: &AuthRequest) -> Result<AuthResponse>;
}

/// Remote-desktop embedding SDK
#[async_trait]
pub trait EmbedSdk: Send + Sync {
    /// Attach a live view of `embed_url` to `surface`.
    async fn attach(
        &self,
        surface: &DisplaySurface,
        embed_url: &str,
        options: &AttachOptions,
    ) -> Result<EmbedHandle>;
}
