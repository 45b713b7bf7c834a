//! Persistence layer for cvm-session
//!
//! Provides:
//! - A key-value credential store trait (survives restarts)
//! - SQLite and in-memory implementations
//! - Typed access to the persisted credential keys

mod credentials;
mod memory;
mod sqlite;
mod traits;

pub use credentials::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;

use cvm_util::CvmError;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<StoreError> for CvmError {
    fn from(e: StoreError) -> Self {
        CvmError::store(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
