//! # Moderation
//!
//! Administrator actions on users and posts. The `apply_*` functions are
//! the pure batch rules; the async wrappers check the admin session, run the
//! rule over the stored collection and persist it in one pass.

use std::collections::HashSet;

use log::{info, warn};
use tf_core::error::{AppError, Denied, Invalid, Result};
use tf_core::models::{ColorTag, PinLevel, Post, User};

use crate::posts::PostDraft;
use crate::session::Session;
use crate::store::ForumStore;

/// Password assigned by a batch reset.
pub const RESET_PASSWORD: &str = "123456";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserBatch {
    /// Skips administrators.
    Disable,
    Enable,
    /// Skips administrators.
    ResetPassword,
    AddPoints(i64),
}

impl UserBatch {
    fn skips_admins(self) -> bool {
        matches!(self, UserBatch::Disable | UserBatch::ResetPassword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostBatch {
    /// Clears sale flag, price and hidden content.
    SetFree,
    Pin(PinLevel),
    ColorTag(Option<ColorTag>),
}

fn selection(ids: &[String]) -> Result<HashSet<&str>> {
    if ids.is_empty() {
        return Err(Invalid::EmptySelection.into());
    }
    Ok(ids.iter().map(String::as_str).collect())
}

/// Applies `op` to every selected user not excluded by its guard.
/// Returns how many users were changed.
pub fn apply_user_batch(users: &mut [User], selected: &[String], op: UserBatch) -> Result<usize> {
    let selected = selection(selected)?;
    if let UserBatch::AddPoints(n) = op {
        if n <= 0 {
            return Err(Invalid::NonPositiveAmount.into());
        }
        let overflows = users
            .iter()
            .filter(|u| selected.contains(u.id.as_str()))
            .any(|u| u.points.checked_add(n).is_none());
        if overflows {
            return Err(Invalid::PointsOverflow.into());
        }
    }

    let mut changed = 0;
    for user in users.iter_mut().filter(|u| selected.contains(u.id.as_str())) {
        if user.is_admin && op.skips_admins() {
            warn!("{op:?} skipped administrator {}", user.username);
            continue;
        }
        match op {
            UserBatch::Disable => user.is_active = false,
            UserBatch::Enable => user.is_active = true,
            UserBatch::ResetPassword => user.password = RESET_PASSWORD.to_string(),
            UserBatch::AddPoints(n) => user.points += n,
        }
        changed += 1;
    }
    Ok(changed)
}

/// Applies `op` to every selected post. Returns how many posts were changed.
pub fn apply_post_batch(posts: &mut [Post], selected: &[String], op: PostBatch) -> Result<usize> {
    let selected = selection(selected)?;
    let mut changed = 0;
    for post in posts.iter_mut().filter(|p| selected.contains(p.id.as_str())) {
        match op {
            PostBatch::SetFree => {
                post.is_for_sale = false;
                post.price = None;
                post.sold_content = None;
            }
            PostBatch::Pin(level) => post.pinned_level = level,
            PostBatch::ColorTag(tag) => post.color_tag = tag,
        }
        changed += 1;
    }
    Ok(changed)
}

/// Removes the selected posts. Returns how many were removed.
pub fn remove_posts(posts: &mut Vec<Post>, selected: &[String]) -> Result<usize> {
    let selected = selection(selected)?;
    let before = posts.len();
    posts.retain(|p| !selected.contains(p.id.as_str()));
    Ok(before - posts.len())
}

/// Ids eligible for batch selection: every non-admin user.
pub fn selectable_users(users: &[User]) -> Vec<String> {
    users.iter().filter(|u| !u.is_admin).map(|u| u.id.clone()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForumStats {
    pub users: usize,
    pub posts: usize,
    pub active_users: usize,
}

pub fn stats(users: &[User], posts: &[Post]) -> ForumStats {
    ForumStats {
        users: users.len(),
        posts: posts.len(),
        active_users: users.iter().filter(|u| u.is_active).count(),
    }
}

pub async fn batch_users(store: &ForumStore, session: &Session, selected: &[String], op: UserBatch) -> Result<usize> {
    session.require_admin()?;
    let mut users = store.get_users().await?;
    let changed = apply_user_batch(&mut users, selected, op)?;
    store.save_users(&users).await?;
    info!("{} applied {op:?} to {changed} of {} users", session.user().username, selected.len());
    Ok(changed)
}

pub async fn batch_posts(store: &ForumStore, session: &Session, selected: &[String], op: PostBatch) -> Result<usize> {
    session.require_admin()?;
    let mut posts = store.get_posts().await?;
    let changed = apply_post_batch(&mut posts, selected, op)?;
    store.save_posts(&posts).await?;
    info!("{} applied {op:?} to {changed} posts", session.user().username);
    Ok(changed)
}

pub async fn batch_delete_posts(store: &ForumStore, session: &Session, selected: &[String]) -> Result<usize> {
    session.require_admin()?;
    let mut posts = store.get_posts().await?;
    let removed = remove_posts(&mut posts, selected)?;
    store.save_posts(&posts).await?;
    info!("{} deleted {removed} posts", session.user().username);
    Ok(removed)
}

/// Flips a regular user between active and disabled.
pub async fn toggle_user_active(store: &ForumStore, session: &Session, user_id: &str) -> Result<User> {
    session.require_admin()?;
    let mut users = store.get_users().await?;
    let user = users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| AppError::NotFound("User", user_id.to_string()))?;
    if user.is_admin {
        return Err(Denied::AdminProtected.into());
    }
    user.is_active = !user.is_active;
    let user = user.clone();
    store.save_users(&users).await?;
    info!("user {} is now {}", user.username, if user.is_active { "active" } else { "disabled" });
    Ok(user)
}

/// Replaces a user record with an edited copy.
pub async fn update_user(store: &ForumStore, session: &Session, edited: User) -> Result<()> {
    session.require_admin()?;
    if edited.points < 0 {
        return Err(Invalid::NegativePoints.into());
    }
    let mut users = store.get_users().await?;
    let slot = users
        .iter_mut()
        .find(|u| u.id == edited.id)
        .ok_or_else(|| AppError::NotFound("User", edited.id.clone()))?;
    *slot = edited;
    store.save_users(&users).await
}

/// Publishes a post on behalf of an existing user. New posts go first.
pub async fn create_post(store: &ForumStore, session: &Session, draft: PostDraft) -> Result<Post> {
    session.require_admin()?;
    if draft.author_id.is_empty() {
        return Err(Invalid::Required("author").into());
    }
    let author = store.find_user(&draft.author_id).await?;
    let post = draft.into_post(&author)?;

    let mut posts = store.get_posts().await?;
    posts.insert(0, post.clone());
    store.save_posts(&posts).await?;
    info!("{} published post {} for {}", session.user().username, post.id, author.username);
    Ok(post)
}

/// Overwrites the editable fields of a post.
///
/// The post keeps its author and creation time; `draft.author_id` is not
/// consulted.
pub async fn update_post(store: &ForumStore, session: &Session, post_id: &str, draft: PostDraft) -> Result<Post> {
    session.require_admin()?;
    let valid = draft.validate()?;
    let mut posts = store.get_posts().await?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or_else(|| AppError::NotFound("Post", post_id.to_string()))?;
    post.title = valid.title;
    post.content = valid.content;
    post.is_for_sale = valid.is_for_sale;
    post.price = valid.price;
    post.sold_content = valid.sold_content;
    let post = post.clone();
    store.save_posts(&posts).await?;
    Ok(post)
}

async fn edit_post<F>(store: &ForumStore, session: &Session, post_id: &str, edit: F) -> Result<Post>
where
    F: FnOnce(&mut Post),
{
    session.require_admin()?;
    let mut posts = store.get_posts().await?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or_else(|| AppError::NotFound("Post", post_id.to_string()))?;
    edit(post);
    let post = post.clone();
    store.save_posts(&posts).await?;
    Ok(post)
}

pub async fn set_pin_level(store: &ForumStore, session: &Session, post_id: &str, level: PinLevel) -> Result<Post> {
    edit_post(store, session, post_id, |p| p.pinned_level = level).await
}

pub async fn set_color_tag(store: &ForumStore, session: &Session, post_id: &str, tag: Option<ColorTag>) -> Result<Post> {
    edit_post(store, session, post_id, |p| p.color_tag = tag).await
}

/// Unpins a pinned post, otherwise pins it at [`PinLevel::Admin`].
pub async fn toggle_pin(store: &ForumStore, session: &Session, post_id: &str) -> Result<Post> {
    edit_post(store, session, post_id, |p| {
        p.pinned_level = if p.is_pinned() { PinLevel::None } else { PinLevel::Admin };
    })
    .await
}

/// Sets `tag`, or clears it when the post already carries `tag`.
pub async fn toggle_color_tag(store: &ForumStore, session: &Session, post_id: &str, tag: ColorTag) -> Result<Post> {
    edit_post(store, session, post_id, |p| {
        p.color_tag = if p.color_tag == Some(tag) { None } else { Some(tag) };
    })
    .await
}

pub async fn delete_post(store: &ForumStore, session: &Session, post_id: &str) -> Result<()> {
    session.require_admin()?;
    let mut posts = store.get_posts().await?;
    let before = posts.len();
    posts.retain(|p| p.id != post_id);
    if posts.len() == before {
        return Err(AppError::NotFound("Post", post_id.to_string()));
    }
    store.save_posts(&posts).await?;
    info!("{} deleted post {post_id}", session.user().username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::login;
    use crate::memory::MemoryKvStore;
    use tf_core::seed;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn admin_store() -> (ForumStore, Session) {
        let store = ForumStore::new(Box::new(MemoryKvStore::new()));
        let session = login(&store, "admin", "admin123", "127.0.0.1").await.unwrap();
        (store, session)
    }

    #[test]
    fn test_disable_skips_admin() {
        let mut users = seed::default_users();
        let changed = apply_user_batch(&mut users, &ids(&["1", "2", "3"]), UserBatch::Disable).unwrap();
        assert_eq!(changed, 2);
        assert!(users[0].is_active);
        assert!(!users[1].is_active);
        assert!(!users[2].is_active);
    }

    #[test]
    fn test_reset_password_skips_admin_but_enable_does_not() {
        let mut users = seed::default_users();
        users[0].is_active = false;
        apply_user_batch(&mut users, &ids(&["1", "3"]), UserBatch::ResetPassword).unwrap();
        assert_eq!(users[0].password, "admin123");
        assert_eq!(users[2].password, RESET_PASSWORD);

        let changed = apply_user_batch(&mut users, &ids(&["1"]), UserBatch::Enable).unwrap();
        assert_eq!(changed, 1);
        assert!(users[0].is_active);
    }

    #[test]
    fn test_add_points_requires_positive_amount() {
        let mut users = seed::default_users();
        let err = apply_user_batch(&mut users, &ids(&["2"]), UserBatch::AddPoints(0)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(Invalid::NonPositiveAmount)));

        apply_user_batch(&mut users, &ids(&["1", "2"]), UserBatch::AddPoints(25)).unwrap();
        assert_eq!(users[0].points, 1025);
        assert_eq!(users[1].points, 175);
        assert_eq!(users[2].points, 280);
    }

    #[test]
    fn test_add_points_overflow_leaves_batch_untouched() {
        let mut users = seed::default_users();
        let err = apply_user_batch(&mut users, &ids(&["1", "2"]), UserBatch::AddPoints(i64::MAX)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(Invalid::PointsOverflow)));
        assert_eq!(users, seed::default_users());
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut posts = seed::default_posts();
        let err = apply_post_batch(&mut posts, &[], PostBatch::SetFree).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(Invalid::EmptySelection)));
    }

    #[test]
    fn test_post_batches() {
        let mut posts = seed::default_posts();
        let selected = ids(&["2", "4", "unknown"]);

        assert_eq!(apply_post_batch(&mut posts, &selected, PostBatch::SetFree).unwrap(), 2);
        assert!(!posts[0].is_for_sale && posts[0].price.is_none() && posts[0].sold_content.is_none());
        assert!(posts[1].is_for_sale);

        apply_post_batch(&mut posts, &selected, PostBatch::Pin(PinLevel::Permanent)).unwrap();
        assert!(posts[2].is_pinned());
        apply_post_batch(&mut posts, &selected, PostBatch::ColorTag(Some(ColorTag::Green))).unwrap();
        assert_eq!(posts[2].color_tag, Some(ColorTag::Green));
        assert_eq!(posts[3].color_tag, None);

        assert_eq!(remove_posts(&mut posts, &selected).unwrap(), 2);
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn test_selectable_users_and_stats() {
        let mut users = seed::default_users();
        users[2].is_active = false;
        assert_eq!(selectable_users(&users), ids(&["2", "3"]));
        let s = stats(&users, &seed::default_posts());
        assert_eq!(s, ForumStats { users: 3, posts: 4, active_users: 2 });
    }

    #[tokio::test]
    async fn test_admin_session_required() {
        let store = ForumStore::new(Box::new(MemoryKvStore::new()));
        let member = login(&store, "张三", "123456", "127.0.0.1").await.unwrap();
        let err = batch_users(&store, &member, &ids(&["3"]), UserBatch::Disable).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(Denied::AdminRequired)));
        assert!(store.find_user("3").await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_batch_users_persists() {
        let (store, admin) = admin_store().await;
        let changed = batch_users(&store, &admin, &ids(&["1", "2", "3"]), UserBatch::Disable).await.unwrap();
        assert_eq!(changed, 2);
        let users = store.get_users().await.unwrap();
        assert_eq!(users.iter().map(|u| u.is_active).collect::<Vec<_>>(), [true, false, false]);
    }

    #[tokio::test]
    async fn test_toggle_user_protects_admins() {
        let (store, admin) = admin_store().await;
        let err = toggle_user_active(&store, &admin, "1").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(Denied::AdminProtected)));

        assert!(!toggle_user_active(&store, &admin, "2").await.unwrap().is_active);
        assert!(toggle_user_active(&store, &admin, "2").await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_user_rejects_negative_points() {
        let (store, admin) = admin_store().await;
        let mut user = store.find_user("2").await.unwrap();
        user.points = -1;
        let err = update_user(&store, &admin, user.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(Invalid::NegativePoints)));

        user.points = 0;
        user.email = Some("z3@example.com".into());
        update_user(&store, &admin, user.clone()).await.unwrap();
        assert_eq!(store.find_user("2").await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_create_and_update_post() {
        let (store, admin) = admin_store().await;
        let draft = PostDraft {
            title: "Kindle".into(),
            content: "Paperwhite, like new".into(),
            author_id: "3".into(),
            is_for_sale: true,
            price: Some(450.0),
            sold_content: Some("wechat: kindle_seller".into()),
        };
        let post = create_post(&store, &admin, draft.clone()).await.unwrap();
        assert_eq!(post.author_name, "李四");
        assert_eq!(store.get_posts().await.unwrap()[0].id, post.id);

        let ghost = PostDraft { author_id: "999".into(), ..draft.clone() };
        assert!(matches!(create_post(&store, &admin, ghost).await, Err(AppError::NotFound("User", _))));
        let anonymous = PostDraft { author_id: String::new(), ..draft.clone() };
        assert!(matches!(
            create_post(&store, &admin, anonymous).await,
            Err(AppError::ValidationError(Invalid::Required("author")))
        ));

        let free = PostDraft { is_for_sale: false, author_id: "2".into(), ..draft };
        let updated = update_post(&store, &admin, &post.id, free).await.unwrap();
        assert!(!updated.is_for_sale);
        assert_eq!((updated.author_id.as_str(), updated.author_name.as_str()), ("3", "李四"));
        assert_eq!(updated.sold_content, None);
        assert_eq!(updated.create_time, post.create_time);
    }

    #[tokio::test]
    async fn test_detail_toggles_and_delete() {
        let (store, admin) = admin_store().await;

        assert_eq!(toggle_pin(&store, &admin, "5").await.unwrap().pinned_level, PinLevel::Admin);
        assert_eq!(toggle_pin(&store, &admin, "5").await.unwrap().pinned_level, PinLevel::None);
        assert_eq!(set_pin_level(&store, &admin, "5", PinLevel::Normal).await.unwrap().pinned_level, PinLevel::Normal);

        assert_eq!(toggle_color_tag(&store, &admin, "5", ColorTag::Red).await.unwrap().color_tag, Some(ColorTag::Red));
        assert_eq!(toggle_color_tag(&store, &admin, "5", ColorTag::Blue).await.unwrap().color_tag, Some(ColorTag::Blue));
        assert_eq!(toggle_color_tag(&store, &admin, "5", ColorTag::Blue).await.unwrap().color_tag, None);
        assert_eq!(set_color_tag(&store, &admin, "5", Some(ColorTag::Yellow)).await.unwrap().color_tag, Some(ColorTag::Yellow));

        delete_post(&store, &admin, "5").await.unwrap();
        assert!(matches!(delete_post(&store, &admin, "5").await, Err(AppError::NotFound("Post", _))));
        assert_eq!(batch_delete_posts(&store, &admin, &ids(&["2", "3"])).await.unwrap(), 2);
        assert_eq!(store.get_posts().await.unwrap().len(), 1);
    }
}
