//! trade-forum/crates/tf-core/src/lib.rs
//!
//! The domain models and interface definitions for the trading forum.

pub mod models;
pub mod traits;
pub mod error;
pub mod seed;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;
