//! Entitlement-dependent presentation

use chrono::{DateTime, Local};
use cvm_api::{Entitlement, Theme};
use cvm_util::PartOfDay;

/// Fallback name in the greeting
const GREETING_FALLBACK_NAME: &str = "User";

/// What the page shows for the current entitlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub entitlement: Entitlement,
    pub theme: Theme,
    /// Only premium users are greeted
    pub greeting: Option<String>,
    /// Show the premium thanks in place of the risk notice and hide the
    /// "What is premium?" upsell
    pub premium_notice: bool,
}

impl Presentation {
    pub fn for_entitlement(
        entitlement: Entitlement,
        username: Option<&str>,
        now: &DateTime<Local>,
    ) -> Self {
        match entitlement {
            Entitlement::Premium => Self {
                entitlement,
                theme: Theme::Premium,
                greeting: Some(greeting(username, now)),
                premium_notice: true,
            },
            Entitlement::Free => Self {
                entitlement,
                theme: Theme::Standard,
                greeting: None,
                premium_notice: false,
            },
        }
    }
}

/// "Good morning, alice" and friends
pub fn greeting(username: Option<&str>, now: &DateTime<Local>) -> String {
    let name = username
        .filter(|name| !name.is_empty())
        .unwrap_or(GREETING_FALLBACK_NAME);
    format!("Good {}, {}", PartOfDay::of(now).as_str(), name)
}
