//! # Paid content
//!
//! A post that is for sale keeps its `sold_content` hidden from a viewer
//! until a purchase marker exists for that viewer and post.
//!
//! There is no concurrency control: two sessions of the same user can each
//! pass the points check before either one writes.

use log::info;
use tf_core::error::{AppError, Invalid, Result};
use tf_core::models::Post;

use crate::session::Session;
use crate::store::ForumStore;

/// Points charged to unlock a post, independent of its listed price.
pub const PURCHASE_PRICE: i64 = 10;

/// Whether `viewer` may see the hidden part of `post`.
pub async fn is_unlocked(store: &ForumStore, viewer: Option<&Session>, post: &Post) -> Result<bool> {
    match viewer {
        Some(session) if post.is_for_sale => store.has_purchased(session.user_id(), &post.id).await,
        _ => Ok(false),
    }
}

/// The hidden content of `post` if `viewer` has unlocked it.
pub async fn visible_sold_content<'p>(store: &ForumStore, viewer: Option<&Session>, post: &'p Post) -> Result<Option<&'p str>> {
    if is_unlocked(store, viewer, post).await? {
        Ok(post.sold_content.as_deref())
    } else {
        Ok(None)
    }
}

/// Spends `price` points of the session user to unlock `post_id`.
///
/// The points check uses the session's copy of the user; the deduction is
/// applied to the stored record and mirrored into the session. Buying a
/// post that is already unlocked charges nothing. `price` must be positive.
pub async fn purchase(store: &ForumStore, session: &mut Session, post_id: &str, price: i64) -> Result<()> {
    if price <= 0 {
        return Err(Invalid::NonPositiveAmount.into());
    }
    let post = store.find_post(post_id).await?;
    if !post.is_for_sale {
        return Err(Invalid::NotForSale.into());
    }
    if store.has_purchased(session.user_id(), post_id).await? {
        return Ok(());
    }

    let available = session.user().points;
    if available < price {
        return Err(AppError::InsufficientPoints { required: price, available });
    }

    let mut users = store.get_users().await?;
    let user = users
        .iter_mut()
        .find(|u| u.id == session.user_id())
        .ok_or_else(|| AppError::NotFound("User", session.user_id().to_string()))?;
    user.points -= price;
    let user = user.clone();
    store.save_users(&users).await?;
    session.refresh(store, user).await?;

    store.record_purchase(session.user_id(), post_id).await?;
    info!("user {} unlocked post {post_id} for {price} points", session.user().username);
    Ok(())
}
