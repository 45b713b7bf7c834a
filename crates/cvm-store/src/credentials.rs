//! Typed access to the persisted credential keys

use cvm_api::{PREMIUM_FLAG_SET, PREMIUM_FLAG_UNSET, PREMIUM_KEY, TOKEN_KEY, USERNAME_KEY};
use tracing::debug;

use crate::{CredentialStore, StoreResult};

/// Raw persisted credential values, exactly as stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedCredential {
    pub token: Option<String>,
    pub username: Option<String>,
    pub premium_flag: Option<String>,
}

impl PersistedCredential {
    /// Read the current values from the store
    pub fn load(store: &dyn CredentialStore) -> StoreResult<Self> {
        Ok(Self {
            token: store.get(TOKEN_KEY)?,
            username: store.get(USERNAME_KEY)?,
            premium_flag: store.get(PREMIUM_KEY)?,
        })
    }

    /// A non-empty token is present
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Persist a successful login or signup
///
/// All three keys are written in one batch: either all of them land or none.
pub fn save_account_grant(
    store: &dyn CredentialStore,
    token: &str,
    username: &str,
    premium: bool,
) -> StoreResult<()> {
    let flag = if premium {
        PREMIUM_FLAG_SET
    } else {
        PREMIUM_FLAG_UNSET
    };
    store.set_many(&[(TOKEN_KEY, token), (USERNAME_KEY, username), (PREMIUM_KEY, flag)])?;
    debug!(username, premium, "Account grant persisted");
    Ok(())
}
