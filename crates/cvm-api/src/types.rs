//! Domain types

use cvm_util::RemoteSessionId;
use serde::{Deserialize, Serialize};

/// Access tier governing quota and presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entitlement {
    #[default]
    Free,
    Premium,
}

impl Entitlement {
    pub fn is_premium(&self) -> bool {
        matches!(self, Entitlement::Premium)
    }
}

/// Credentials for the current visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub identifier: String,
    /// Absent for guests
    pub auth_token: Option<String>,
    pub entitlement: Entitlement,
}

impl Credential {
    /// A guest credential: no token, always free
    pub fn guest() -> Self {
        Self {
            identifier: crate::GUEST_USERNAME.to_string(),
            auth_token: None,
            entitlement: Entitlement::Free,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.auth_token.as_deref().is_none_or(str::is_empty)
    }
}

/// A candidate session backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub label: String,
    pub is_selected: bool,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            is_selected: false,
        }
    }
}

/// Data needed to attach a live remote-desktop view
///
/// Created only by a successful launch and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    /// Always starts with an http(s) scheme
    pub embed_url: String,
    pub session_id: Option<RemoteSessionId>,
}

/// Phase of the lifecycle controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Unauthenticated,
    Authenticating,
    AwaitingConsent,
    Launching,
    Active,
    LaunchFailed,
    Expired,
}

impl LifecyclePhase {
    /// No further transitions happen from a terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecyclePhase::LaunchFailed | LifecyclePhase::Expired)
    }
}

/// Which account operation the auth form submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }

    /// Path segment on the account backend
    pub fn path(&self) -> &'static str {
        match self {
            AuthMode::Login => "login",
            AuthMode::Signup => "signup",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Signup => "Sign Up",
        }
    }
}

/// Visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Standard,
    Premium,
}

/// Visibility of the chrome around the remote view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenLayout {
    pub fullscreen: bool,
    pub bottom_bar_visible: bool,
    /// Fullscreen overlay wrapper holding the auxiliary timer
    pub aux_timer_wrapper_visible: bool,
    /// Auxiliary timer text inside the wrapper (collapsible)
    pub aux_timer_expanded: bool,
}

impl ScreenLayout {
    pub fn windowed() -> Self {
        Self {
            fullscreen: false,
            bottom_bar_visible: true,
            aux_timer_wrapper_visible: false,
            aux_timer_expanded: true,
        }
    }

    /// Entering fullscreen always expands the auxiliary timer
    pub fn fullscreen() -> Self {
        Self {
            fullscreen: true,
            bottom_bar_visible: false,
            aux_timer_wrapper_visible: true,
            aux_timer_expanded: true,
        }
    }
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self::windowed()
    }
}

/// User-facing dialogs raised by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Login or signup failed; message is shown verbatim
    AuthError { message: String },
    /// Launch failed; message is the generic one
    LaunchFailed { message: String },
    /// Low-time warning
    LowTime { remaining_seconds: u64 },
    /// Asks whether the remote view stayed black
    BlackScreenPrompt,
    /// Advice shown after the user reports a black screen
    ConnectivityHelp,
    /// Quota exhausted; the page is about to navigate away
    SessionEnded,
}
