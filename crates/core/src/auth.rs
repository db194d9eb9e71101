//! Credential verification.

use crate::error::AuthError;
use crate::identity::Identity;
use crate::store::PersistenceStore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const HASH_PREFIX: &str = "sha256$";

/// Encodes a password the way new account rows store it.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{}{}", HASH_PREFIX, hex::encode(digest))
}

/// Which stored password forms the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPolicy {
    /// Only `sha256$` rows match.
    HashedOnly,
    /// Hashed rows first, then rows holding the password verbatim.
    AllowLegacyPlaintext,
}

/// Checks login/password pairs against the store.
pub struct AuthGateway {
    store: Arc<dyn PersistenceStore>,
    policy: CredentialPolicy,
}

impl AuthGateway {
    pub fn new(store: Arc<dyn PersistenceStore>, policy: CredentialPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the matching identity or `AuthError::InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<Identity, AuthError> {
        if let Some(identity) = self
            .store
            .find_user_by_credentials(login, &hash_password(password))
            .await?
        {
            info!(user_id = identity.id, role = %identity.role, "Login succeeded");
            return Ok(identity);
        }

        // A stored digest typed as the password must not pass as plaintext.
        let try_plaintext = self.policy == CredentialPolicy::AllowLegacyPlaintext
            && !password.starts_with(HASH_PREFIX);
        if try_plaintext {
            if let Some(identity) = self.store.find_user_by_credentials(login, password).await? {
                warn!(user_id = identity.id, "Login matched a plaintext password row");
                return Ok(identity);
            }
        }

        info!("Login rejected");
        Err(AuthError::InvalidCredentials)
    }
}
