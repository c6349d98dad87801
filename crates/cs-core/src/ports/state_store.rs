//! Durable key-value state: the freshness marker and the pasted credential.

use async_trait::async_trait;

use super::errors::StateStoreError;

/// Key of the last freshness marker that led to a completed sync.
pub const LAST_KNOWN_MARKER_KEY: &str = "lastKnownMarker";

/// Key of the bearer credential used by the upload client.
pub const CREDENTIAL_KEY: &str = "github_token";

#[async_trait]
pub trait StateStorePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StateStoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StateStoreError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StateStoreError>;
}
