//! In-process [`KvStore`]. Contents vanish with the process.

use async_trait::async_trait;
use dashmap::DashMap;
use tf_core::traits::KvStore;

#[derive(Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn contains(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self.entries.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_overwrites_and_remove_is_idempotent() {
        let kv = MemoryKvStore::new();
        kv.set("k", "1".into()).await.unwrap();
        kv.set("k", "2".into()).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("2"));
        assert_eq!(kv.len(), 1);

        kv.remove("k").await.unwrap();
        kv.remove("k").await.unwrap();
        assert!(!kv.contains("k").await.unwrap());
        assert!(kv.is_empty());
    }
}
