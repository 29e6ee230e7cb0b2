//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

/// String-keyed persistence area scoped to one profile.
///
/// Values are opaque strings (JSON in practice). Writes replace the whole
/// value; there is no locking, so concurrent writers race last-write-wins.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> anyhow::Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> anyhow::Result<()>;

    async fn contains(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
