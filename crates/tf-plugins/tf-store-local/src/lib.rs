//! # tf-store-local
//! trade-forum/crates/tf-plugins/tf-store-local/src/lib.rs
//! Local filesystem implementation of `KvStore`.
//! One directory is one profile; every key is one file, named by the hash
//! of the key and sharded into two directory levels.

use async_trait::async_trait;
use log::debug;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;
use tf_core::traits::KvStore;
use tokio::fs;

pub struct LocalFileStore {
    /// Profile directory (e.g., "./data/forum")
    root_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Generates a sharded path: "ab/cd/abcd...hash.json"
    fn get_sharded_path(&self, key: &str) -> PathBuf {
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(format!("{hash}.json"));
        path
    }
}

#[async_trait]
impl KvStore for LocalFileStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.get_sharded_path(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file first and renames it into place, so a
    /// reader never sees a half-written value.
    async fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        let target_path = self.get_sharded_path(key);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp_path = target_path.with_extension("json.tmp");
        fs::write(&tmp_path, value.as_bytes()).await?;
        fs::rename(&tmp_path, &target_path).await?;
        debug!("stored {key} at {}", target_path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.get_sharded_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn contains(&self, key: &str) -> anyhow::Result<bool> {
        Ok(fs::try_exists(self.get_sharded_path(key)).await?)
    }
}
