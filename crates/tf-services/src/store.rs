//! # ForumStore
//!
//! Typed access to the forum collections kept in a [`KvStore`].
//!
//! Layout of the persistence area:
//! - `forum_users`: JSON array of [`User`]
//! - `forum_posts`: JSON array of [`Post`]
//! - `forum_user`: the logged-in [`User`], absent when logged out
//! - `purchased_{userId}_{postId}`: presence-only unlock marker
//!
//! Every write replaces a whole collection. Missing collections read as the
//! seed set; values that fail to decode are reported as [`AppError::Corrupt`].

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tf_core::error::{AppError, Result};
use tf_core::models::{Post, User};
use tf_core::seed;
use tf_core::traits::KvStore;

pub const USERS_KEY: &str = "forum_users";
pub const POSTS_KEY: &str = "forum_posts";
pub const SESSION_KEY: &str = "forum_user";

/// Key of the marker recording that `user_id` unlocked `post_id`.
pub fn purchase_key(user_id: &str, post_id: &str) -> String {
    format!("purchased_{user_id}_{post_id}")
}

pub struct ForumStore {
    kv: Box<dyn KvStore>,
}

impl ForumStore {
    pub fn new(kv: Box<dyn KvStore>) -> Self {
        Self { kv }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        debug!("reading {key}");
        match self.kv.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| AppError::Corrupt { key: key.to_string(), source }),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        debug!("writing {key}");
        let raw = serde_json::to_string(value).map_err(anyhow::Error::from)?;
        self.kv.set(key, raw).await?;
        Ok(())
    }

    /// Persisted users, or the seed set when none were ever saved.
    pub async fn get_users(&self) -> Result<Vec<User>> {
        Ok(self.read(USERS_KEY).await?.unwrap_or_else(seed::default_users))
    }

    pub async fn save_users(&self, users: &[User]) -> Result<()> {
        self.write(USERS_KEY, users).await
    }

    /// Persisted posts, or the seed set when none were ever saved.
    pub async fn get_posts(&self) -> Result<Vec<Post>> {
        Ok(self.read(POSTS_KEY).await?.unwrap_or_else(seed::default_posts))
    }

    pub async fn save_posts(&self, posts: &[Post]) -> Result<()> {
        self.write(POSTS_KEY, posts).await
    }

    pub async fn get_current_user(&self) -> Result<Option<User>> {
        self.read(SESSION_KEY).await
    }

    pub async fn save_current_user(&self, user: &User) -> Result<()> {
        self.write(SESSION_KEY, user).await
    }

    /// Drops the session record. Collections are untouched.
    pub async fn logout(&self) -> Result<()> {
        self.kv.remove(SESSION_KEY).await?;
        Ok(())
    }

    /// Writes the current (possibly seeded) collections back so that later
    /// reads are served from storage.
    pub async fn initialize(&self) -> Result<()> {
        let posts = self.get_posts().await?;
        self.save_posts(&posts).await?;
        let users = self.get_users().await?;
        self.save_users(&users).await
    }

    pub async fn find_user(&self, id: &str) -> Result<User> {
        self.get_users()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound("User", id.to_string()))
    }

    pub async fn find_post(&self, id: &str) -> Result<Post> {
        self.get_posts()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Post", id.to_string()))
    }

    pub async fn has_purchased(&self, user_id: &str, post_id: &str) -> Result<bool> {
        Ok(self.kv.contains(&purchase_key(user_id, post_id)).await?)
    }

    pub async fn record_purchase(&self, user_id: &str, post_id: &str) -> Result<()> {
        self.kv.set(&purchase_key(user_id, post_id), "true".to_string()).await?;
        Ok(())
    }
}
