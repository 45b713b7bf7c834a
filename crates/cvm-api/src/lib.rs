//! Shared types for cvm-session
//!
//! This crate defines the vocabulary shared by the controller and its
//! collaborators:
//! - Domain types (credentials, endpoints, session descriptors, phases)
//! - Wire payloads for the session and account backends
//! - Persisted-state keys

mod types;
mod wire;

pub use types::*;
pub use wire::*;

/// Persisted key holding the account auth token
pub const TOKEN_KEY: &str = "cvm_token";

/// Persisted key holding the account username
pub const USERNAME_KEY: &str = "cvm_username";

/// Persisted key holding the premium flag (`"1"` or `"0"`)
pub const PREMIUM_KEY: &str = "cvm_premium";

/// The only premium flag value that grants premium
pub const PREMIUM_FLAG_SET: &str = "1";

/// The premium flag value written for free accounts
pub const PREMIUM_FLAG_UNSET: &str = "0";

/// Username sent to session backends when nobody is logged in
pub const GUEST_USERNAME: &str = "guest";

/// What the user sees when a launch fails, whatever the cause
pub const LAUNCH_FAILURE_MESSAGE: &str =
    "Unable to launch CVM. Possible proxy issue, rate-limit, or network block.";

/// Heading shown to premium users in place of the risk notice
pub const PREMIUM_THANKS_MESSAGE: &str = "Thanks for buying premium and using CVM!";
