//! # Accounts
//!
//! Login, registration and password change. Passwords are compared as
//! stored; the forum makes no security claims.

use chrono::Utc;
use log::{info, warn};
use tf_core::error::{AppError, Denied, Invalid, Result};
use tf_core::models::{new_record_id, User};

use crate::session::Session;
use crate::store::ForumStore;

pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=16;
pub const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=20;
/// Points granted to every new account.
pub const SIGNUP_POINTS: i64 = 100;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Finds the account matching both `username` and `password`.
///
/// Disabled accounts are rejected even when the credentials match.
pub fn authenticate<'a>(users: &'a [User], username: &str, password: &str) -> Result<&'a User> {
    let user = users
        .iter()
        .find(|u| u.username == username && u.password == password)
        .ok_or(Denied::InvalidCredentials)?;
    if !user.is_active {
        return Err(Denied::AccountDisabled.into());
    }
    Ok(user)
}

/// Authenticates, stamps the login time and address, and starts a session.
pub async fn login(store: &ForumStore, username: &str, password: &str, ip: &str) -> Result<Session> {
    let mut users = store.get_users().await?;
    let id = match authenticate(&users, username, password) {
        Ok(user) => user.id.clone(),
        Err(e) => {
            warn!("login rejected for {username}: {e}");
            return Err(e);
        }
    };

    let user = users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| AppError::NotFound("User", id.clone()))?;
    user.last_login_time = Utc::now();
    user.login_ip = ip.to_string();
    let user = user.clone();

    store.save_users(&users).await?;
    info!("user {} logged in from {ip}", user.username);
    Session::start(store, user).await
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Checks a registration against the existing accounts.
///
/// Order: username length, password length, confirmation, uniqueness.
/// Usernames are compared exactly (case-sensitive).
pub fn validate_registration(users: &[User], form: &RegisterForm) -> Result<()> {
    if !USERNAME_LEN.contains(&char_len(&form.username)) {
        return Err(Invalid::UsernameLength.into());
    }
    if !PASSWORD_LEN.contains(&char_len(&form.password)) {
        return Err(Invalid::PasswordLength.into());
    }
    if form.password != form.confirm_password {
        return Err(Invalid::PasswordMismatch.into());
    }
    if users.iter().any(|u| u.username == form.username) {
        return Err(AppError::UsernameTaken(form.username.clone()));
    }
    Ok(())
}

/// Creates a regular account and logs it in.
pub async fn register(store: &ForumStore, form: &RegisterForm, ip: &str) -> Result<Session> {
    let mut users = store.get_users().await?;
    validate_registration(&users, form)?;

    let now = Utc::now();
    let user = User {
        id: new_record_id(),
        username: form.username.clone(),
        password: form.password.clone(),
        email: None,
        register_time: now,
        last_login_time: now,
        login_ip: ip.to_string(),
        points: SIGNUP_POINTS,
        is_admin: false,
        is_active: true,
    };
    users.push(user.clone());
    store.save_users(&users).await?;

    info!("registered user {}", user.username);
    Session::start(store, user).await
}

#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn change_password(store: &ForumStore, session: &mut Session, form: &PasswordChange) -> Result<()> {
    if form.old_password.is_empty() {
        return Err(Invalid::Required("current password").into());
    }
    if form.new_password.is_empty() {
        return Err(Invalid::Required("new password").into());
    }
    if form.confirm_password.is_empty() {
        return Err(Invalid::Required("password confirmation").into());
    }
    if form.old_password != session.user().password {
        return Err(Denied::WrongPassword.into());
    }
    if !PASSWORD_LEN.contains(&char_len(&form.new_password)) {
        return Err(Invalid::PasswordLength.into());
    }
    if form.new_password != form.confirm_password {
        return Err(Invalid::PasswordMismatch.into());
    }

    let mut users = store.get_users().await?;
    let user = users
        .iter_mut()
        .find(|u| u.id == session.user_id())
        .ok_or_else(|| AppError::NotFound("User", session.user_id().to_string()))?;
    user.password = form.new_password.clone();
    let user = user.clone();
    store.save_users(&users).await?;

    info!("user {} changed password", user.username);
    session.refresh(store, user).await
}
