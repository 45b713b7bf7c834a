//! Session lifecycle controller for cvm-session
//!
//! This crate is the heart of cvm-session, containing:
//! - Entitlement resolution from persisted credentials
//! - Endpoint selection
//! - Session launch (request, validate, attach)
//! - Usage timer with low-time warning and forced expiry
//! - Lifecycle state machine
//!   (Unauthenticated -> AwaitingConsent -> Launching -> Active -> Expired)

mod controller;
mod endpoints;
mod entitlement;
mod events;
mod launcher;
mod presentation;
mod ticks;
mod timer;

pub use controller::*;
pub use endpoints::*;
pub use entitlement::*;
pub use events::*;
pub use launcher::*;
pub use presentation::*;
pub use ticks::*;
pub use timer::*;
