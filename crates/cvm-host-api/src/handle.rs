//! Embedding handle abstraction

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Where the live view is rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySurface(String);

impl DisplaySurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplaySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options passed to the SDK when attaching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachOptions {
    /// Permissions granted to the embedded frame (e.g. "fullscreen")
    pub iframe_allow: Vec<String>,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            iframe_allow: vec!["fullscreen".to_string()],
        }
    }
}

/// Connection state reported by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Playing,
}

/// Diagnostic notifications from a live view
///
/// These never feed back into the lifecycle phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SdkEvent {
    ConnectionStateChanged { state: ConnectionState },
    Error { message: String },
    Disconnected { reason: String },
}

/// Live view returned by a successful attach
#[derive(Debug)]
pub struct EmbedHandle {
    embed_url: String,
    events: Option<mpsc::UnboundedReceiver<SdkEvent>>,
}

impl EmbedHandle {
    pub fn new(embed_url: impl Into<String>, events: mpsc::UnboundedReceiver<SdkEvent>) -> Self {
        Self {
            embed_url: embed_url.into(),
            events: Some(events),
        }
    }

    pub fn embed_url(&self) -> &str {
        &self.embed_url
    }

    /// Take the diagnostic event stream; returns None after the first call
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SdkEvent>> {
        self.events.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_allow_fullscreen() {
        assert_eq!(AttachOptions::default().iframe_allow, vec!["fullscreen"]);
    }

    #[test]
    fn events_taken_once() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut handle = EmbedHandle::new("https://x/y", rx);
        assert!(handle.take_events().is_some());
        assert!(handle.take_events().is_none());
        assert_eq!(handle.embed_url(), "https://x/y");
    }

    #[test]
    fn sdk_event_serialization() {
        let event = SdkEvent::ConnectionStateChanged {
            state: ConnectionState::Playing,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("connection_state_changed"));
        assert!(json.contains("playing"));
    }
}
