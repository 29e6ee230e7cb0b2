//! # Session
//!
//! The logged-in user as an explicit value. Operations that need a caller
//! identity take a `&Session` (or `&mut Session` when they change the user
//! record) instead of reading an ambient "current user".

use tf_core::error::{Denied, Result};
use tf_core::models::User;

use crate::store::ForumStore;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: User,
}

impl Session {
    /// Starts a session for `user` and persists it as the current user.
    pub(crate) async fn start(store: &ForumStore, user: User) -> Result<Self> {
        store.save_current_user(&user).await?;
        Ok(Self { user })
    }

    /// Resumes the persisted session, if any.
    pub async fn restore(store: &ForumStore) -> Result<Option<Self>> {
        Ok(store.get_current_user().await?.map(|user| Self { user }))
    }

    /// Like [`Session::restore`], but a missing session is an error.
    pub async fn require(store: &ForumStore) -> Result<Self> {
        Self::restore(store).await?.ok_or_else(|| Denied::NotLoggedIn.into())
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(Denied::AdminRequired.into())
        }
    }

    /// Replaces the session's copy of the user and persists it.
    pub(crate) async fn refresh(&mut self, store: &ForumStore, user: User) -> Result<()> {
        store.save_current_user(&user).await?;
        self.user = user;
        Ok(())
    }
}

/// Ends the session and removes the persisted current user.
pub async fn logout(store: &ForumStore, session: Session) -> Result<()> {
    log::info!("user {} logged out", session.user.username);
    store.logout().await
}
