//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Session launch settings
    #[serde(default)]
    pub session: RawSessionConfig,

    /// Usage timer settings
    #[serde(default)]
    pub timer: RawTimerConfig,

    /// Account backend settings
    #[serde(default)]
    pub account: RawAccountConfig,

    /// Session endpoints offered to everyone (defaults built in when absent)
    pub endpoints: Option<Vec<RawEndpoint>>,

    /// Session endpoints offered to premium users (defaults to `endpoints`)
    pub premium_endpoints: Option<Vec<RawEndpoint>>,
}

/// Session launch settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSessionConfig {
    /// Where the page goes once the quota is exhausted
    pub landing_url: Option<String>,

    /// "direct" or "endpoint_relative"
    pub launch_strategy: Option<String>,

    /// "identity" or "empty"
    pub request_payload: Option<String>,

    /// Display surface the remote view is attached to
    pub display_surface: Option<String>,

    /// Permissions granted to the embedded frame
    pub iframe_allow: Option<Vec<String>>,
}

/// Usage timer settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTimerConfig {
    pub free_quota_seconds: Option<u64>,
    pub premium_quota_seconds: Option<u64>,

    /// Remaining seconds at which the low-time warning fires
    pub warning_seconds: Option<u64>,

    /// Seconds after activation before asking about a black screen (0 disables)
    pub black_screen_hint_seconds: Option<u64>,
}

/// Account backend settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAccountConfig {
    pub base_url: Option<String>,
}

/// Endpoint definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawEndpoint {
    pub url: String,
    pub label: String,
    #[serde(default)]
    pub selected: bool,
}
