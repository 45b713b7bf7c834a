//! Entitlement resolution

use cvm_api::{Credential, Entitlement, GUEST_USERNAME, PREMIUM_FLAG_SET};
use cvm_store::PersistedCredential;

/// Premium only with a non-empty token and a premium flag of exactly `"1"`.
pub fn resolve(persisted: &PersistedCredential) -> Entitlement {
    if persisted.has_token() && persisted.premium_flag.as_deref() == Some(PREMIUM_FLAG_SET) {
        Entitlement::Premium
    } else {
        Entitlement::Free
    }
}

/// Build the visit's credential from persisted values
pub fn credential_from(persisted: &PersistedCredential) -> Credential {
    Credential {
        identifier: persisted
            .username
            .clone()
            .unwrap_or_else(|| GUEST_USERNAME.to_string()),
        auth_token: persisted.token.clone().filter(|t| !t.is_empty()),
        entitlement: resolve(persisted),
    }
}
