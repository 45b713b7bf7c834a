//! In-memory store (tests and throwaway visits)

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{CredentialStore, StoreError, StoreResult};

/// Store that forgets everything when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate from key/value pairs
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        for (key, value) in pairs {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
