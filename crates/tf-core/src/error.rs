//! # AppError
//!
//! Centralized error handling for the trading forum.
//! Every variant renders as the message shown to the user.

use thiserror::Error;

/// The primary error type for all forum operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Record not found (e.g., Post, User, chat contact)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Input rejected before anything was written
    #[error("validation error: {0}")]
    ValidationError(#[from] Invalid),

    /// Credentials or role do not allow the operation
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] Denied),

    #[error("insufficient points: {required} required, {available} available")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("username {0} already exists")]
    UsernameTaken(String),

    /// A stored value could not be decoded
    #[error("corrupt data under key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Storage backend failure (e.g., disk full, database locked)
    #[error("internal service error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Input validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Invalid {
    #[error("username must be 3-16 characters")]
    UsernameLength,
    #[error("password must be 6-20 characters")]
    PasswordLength,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("{0} is required")]
    Required(&'static str),
    #[error("points cannot be negative")]
    NegativePoints,
    #[error("price must be greater than 0")]
    NonPositivePrice,
    #[error("amount must be greater than 0")]
    NonPositiveAmount,
    #[error("points balance would overflow")]
    PointsOverflow,
    #[error("nothing selected")]
    EmptySelection,
    #[error("post is not for sale")]
    NotForSale,
    #[error("only image files can be sent")]
    NotAnImage,
    #[error("image is larger than {max} bytes")]
    ImageTooLarge { max: u64 },
}

/// Access failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Denied {
    #[error("wrong username or password")]
    InvalidCredentials,
    #[error("account is disabled, contact an administrator")]
    AccountDisabled,
    #[error("please log in first")]
    NotLoggedIn,
    #[error("administrator account required")]
    AdminRequired,
    #[error("current password is incorrect")]
    WrongPassword,
    #[error("administrator accounts cannot be changed this way")]
    AdminProtected,
}

/// A specialized Result type for forum logic.
pub type Result<T> = std::result::Result<T, AppError>;
