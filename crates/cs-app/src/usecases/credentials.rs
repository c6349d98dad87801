//! The pasted bearer credential, kept in the durable state store.

use std::sync::Arc;

use tracing::{info, warn};

use cs_core::ports::{StateStoreError, StateStorePort, CREDENTIAL_KEY};
use cs_core::security::looks_like_github_token;
use cs_core::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no GitHub token stored; save one first")]
    Missing,

    #[error("token is empty")]
    Blank,

    #[error(transparent)]
    Store(#[from] StateStoreError),
}

/// Reads, saves and discards the credential.
#[derive(Clone)]
pub struct CredentialVault {
    store: Arc<dyn StateStorePort>,
}

impl CredentialVault {
    pub fn new(store: Arc<dyn StateStorePort>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Option<SecretString>, StateStoreError> {
        let stored = self.store.get(CREDENTIAL_KEY).await?;
        Ok(stored
            .map(|value| SecretString::from(value.as_str()))
            .filter(|secret| !secret.is_blank()))
    }

    pub async fn require(&self) -> Result<SecretString, CredentialError> {
        self.load().await?.ok_or(CredentialError::Missing)
    }

    /// Store a credential. An unexpected prefix only warns; the server has
    /// the final word.
    pub async fn save(&self, credential: &SecretString) -> Result<(), CredentialError> {
        if credential.is_blank() {
            return Err(CredentialError::Blank);
        }
        if !looks_like_github_token(credential.expose()) {
            warn!("Token does not start with ghp_ or github_pat_; saving anyway");
        }
        self.store.set(CREDENTIAL_KEY, credential.expose()).await?;
        info!("GitHub token saved");
        Ok(())
    }

    /// Forget the credential after the server rejected it.
    pub async fn discard(&self) {
        match self.store.remove(CREDENTIAL_KEY).await {
            Ok(()) => info!("Rejected GitHub token removed from state"),
            Err(err) => warn!(error = %err, "Failed to remove rejected GitHub token"),
        }
    }

    /// Forget `rejected` only if it is the stored credential; a different
    /// stored token is left alone.
    pub async fn discard_if_stored(&self, rejected: &SecretString) {
        match self.load().await {
            Ok(Some(stored)) if stored.expose() == rejected.expose() => self.discard().await,
            Ok(_) => info!("Rejected GitHub token is not the stored one, keeping state"),
            Err(err) => warn!(error = %err, "Failed to read stored GitHub token"),
        }
    }
}
