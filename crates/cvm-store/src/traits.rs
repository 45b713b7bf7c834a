//! Store trait definitions

use crate::StoreResult;

/// Key-value store for persisted page state
pub trait CredentialStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write every pair, replacing previous values, or none of them
    fn set_many(&self, pairs: &[(&str, &str)]) -> StoreResult<()>;
}
