//! Events emitted by the lifecycle controller

use cvm_api::{
    AuthMode, Entitlement, LifecyclePhase, Notification, ScreenLayout, SessionDescriptor,
};

/// Events emitted by the controller for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Phase transition
    PhaseChanged {
        from: LifecyclePhase,
        to: LifecyclePhase,
    },

    /// Auth form switched between login and signup; clears any shown error
    AuthModeChanged { mode: AuthMode },

    /// Credential accepted; the auth UI should be hidden
    Authenticated {
        identifier: String,
        entitlement: Entitlement,
    },

    /// Warn before the page is closed or reloaded
    UnloadGuardInstalled,

    /// Stop warning before the page is closed
    UnloadGuardRemoved,

    /// Whether the consent confirm control is enabled
    ConsentChanged { can_confirm: bool },

    /// Consent given; the consent UI should be hidden
    ConsentAccepted,

    /// A different endpoint is now selected
    EndpointSelected { url: String },

    /// Live view attached
    SessionAttached { descriptor: SessionDescriptor },

    /// Usage timer started
    TimerStarted { quota_seconds: u64 },

    /// Text for both the main and the fullscreen timer
    TimerText { text: String },

    /// Timer stopped without expiry
    TimerCancelled,

    /// Dialog to show
    Notify(Notification),

    /// Fullscreen chrome changed
    LayoutChanged(ScreenLayout),

    /// Leave the page
    NavigateTo { url: String },
}
