//! Validated settings

use crate::schema::{RawConfig, RawEndpoint};
use cvm_api::Endpoint;

/// Default landing location after the quota runs out
pub const DEFAULT_LANDING_URL: &str = "https://cvm.rest/";

/// Default account backend
pub const DEFAULT_ACCOUNT_BASE: &str = "https://account.cvm.rest";

/// Default display surface id
pub const DEFAULT_DISPLAY_SURFACE: &str = "hyperbeam-container";

pub const DEFAULT_FREE_QUOTA_SECONDS: u64 = 20 * 60;
pub const DEFAULT_PREMIUM_QUOTA_SECONDS: u64 = 40 * 60;
pub const DEFAULT_WARNING_SECONDS: u64 = 60;
pub const DEFAULT_BLACK_SCREEN_HINT_SECONDS: u64 = 5;

/// How the remote view locator is derived from a launch response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchStrategy {
    /// Use `embed_url` verbatim
    #[default]
    Direct,
    /// Rebuild `<endpoint>/vm/<sessionId><query>` from the response
    EndpointRelative,
}

impl LaunchStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "endpoint_relative" | "endpoint-relative" => Some(Self::EndpointRelative),
            _ => None,
        }
    }
}

/// Shape of the body POSTed to a session endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPayload {
    /// `{}`
    Empty,
    /// `{username, token}`
    #[default]
    Identity,
}

impl RequestPayload {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "empty" => Some(Self::Empty),
            "identity" => Some(Self::Identity),
            _ => None,
        }
    }
}

/// Validated settings ready for use by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub session: SessionSettings,
    pub timer: TimerSettings,
    pub account: AccountSettings,

    /// Endpoints offered to free users and guests
    pub endpoints: Vec<Endpoint>,

    /// Endpoints offered to premium users
    pub premium_endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub landing_url: String,
    pub launch_strategy: LaunchStrategy,
    pub request_payload: RequestPayload,
    pub display_surface: String,
    pub iframe_allow: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub free_quota_seconds: u64,
    pub premium_quota_seconds: u64,
    pub warning_seconds: u64,
    /// None disables the prompt
    pub black_screen_hint_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSettings {
    pub base_url: String,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let endpoints = raw
            .endpoints
            .map(convert_endpoints)
            .unwrap_or_else(default_endpoints);
        let premium_endpoints = raw
            .premium_endpoints
            .map(convert_endpoints)
            .unwrap_or_else(|| endpoints.clone());

        let session = SessionSettings {
            landing_url: raw
                .session
                .landing_url
                .unwrap_or_else(|| DEFAULT_LANDING_URL.to_string()),
            launch_strategy: raw
                .session
                .launch_strategy
                .as_deref()
                .and_then(LaunchStrategy::parse)
                .unwrap_or_default(),
            request_payload: raw
                .session
                .request_payload
                .as_deref()
                .and_then(RequestPayload::parse)
                .unwrap_or_default(),
            display_surface: raw
                .session
                .display_surface
                .unwrap_or_else(|| DEFAULT_DISPLAY_SURFACE.to_string()),
            iframe_allow: raw
                .session
                .iframe_allow
                .unwrap_or_else(|| vec!["fullscreen".to_string()]),
        };

        // 0 disables the black-screen prompt
        let black_screen_hint_seconds = match raw.timer.black_screen_hint_seconds {
            Some(0) => None,
            Some(secs) => Some(secs),
            None => Some(DEFAULT_BLACK_SCREEN_HINT_SECONDS),
        };

        let timer = TimerSettings {
            free_quota_seconds: raw
                .timer
                .free_quota_seconds
                .unwrap_or(DEFAULT_FREE_QUOTA_SECONDS),
            premium_quota_seconds: raw
                .timer
                .premium_quota_seconds
                .unwrap_or(DEFAULT_PREMIUM_QUOTA_SECONDS),
            warning_seconds: raw.timer.warning_seconds.unwrap_or(DEFAULT_WARNING_SECONDS),
            black_screen_hint_seconds,
        };

        let account = AccountSettings {
            base_url: raw
                .account
                .base_url
                .unwrap_or_else(|| DEFAULT_ACCOUNT_BASE.to_string()),
        };

        Self {
            session,
            timer,
            account,
            endpoints,
            premium_endpoints,
        }
    }

    pub fn landing_url(&self) -> &str {
        &self.session.landing_url
    }

    /// Endpoint list for the given tier
    pub fn endpoints_for(&self, premium: bool) -> &[Endpoint] {
        if premium {
            &self.premium_endpoints
        } else {
            &self.endpoints
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_raw(RawConfig {
            config_version: crate::CURRENT_CONFIG_VERSION,
            session: Default::default(),
            timer: Default::default(),
            account: Default::default(),
            endpoints: None,
            premium_endpoints: None,
        })
    }
}

fn convert_endpoints(raw: Vec<RawEndpoint>) -> Vec<Endpoint> {
    raw.into_iter()
        .map(|e| Endpoint {
            url: e.url,
            label: e.label,
            is_selected: e.selected,
        })
        .collect()
}

fn default_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            url: "https://api-main.cvm.rest/".into(),
            label: "Main".into(),
            is_selected: true,
        },
        Endpoint::new("https://api-1.cvm.rest/", "1"),
    ]
}
