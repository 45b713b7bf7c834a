//! Collaborator trait interfaces for cvm-session
//!
//! This crate defines the boundary between the lifecycle controller and the
//! outside world (HTTP backends, the remote-desktop embedding SDK). It
//! contains no network code itself.

mod handle;
mod mock;
mod traits;

pub use handle::*;
pub use mock::*;
pub use traits::*;
