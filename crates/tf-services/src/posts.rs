//! # Posts
//!
//! Listing order, drafting rules and replies.

use std::cmp::Ordering;

use chrono::Utc;
use log::info;
use tf_core::error::{AppError, Invalid, Result};
use tf_core::models::{new_record_id, PinLevel, Post, Reply, User};

use crate::session::Session;
use crate::store::ForumStore;

/// Listing comparator: higher pin level first, then newer first.
pub fn listing_order(a: &Post, b: &Post) -> Ordering {
    b.pinned_level
        .cmp(&a.pinned_level)
        .then_with(|| b.create_time.cmp(&a.create_time))
}

/// Sorts posts for display.
///
/// The sort is stable: posts with equal pin level and creation time keep
/// their relative input order.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(listing_order);
}

/// All posts in listing order.
pub async fn list_posts(store: &ForumStore) -> Result<Vec<Post>> {
    let mut posts = store.get_posts().await?;
    sort_posts(&mut posts);
    Ok(posts)
}

pub async fn find_post(store: &ForumStore, id: &str) -> Result<Post> {
    store.find_post(id).await
}

/// Appends a reply from the session user to a post.
pub async fn add_reply(store: &ForumStore, session: &Session, post_id: &str, content: &str) -> Result<Reply> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Invalid::Required("reply content").into());
    }

    let mut posts = store.get_posts().await?;
    let post = posts
        .iter_mut()
        .find(|p| p.id == post_id)
        .ok_or_else(|| AppError::NotFound("Post", post_id.to_string()))?;

    let reply = Reply {
        id: new_record_id(),
        post_id: post_id.to_string(),
        content: content.to_string(),
        author_id: session.user_id().to_string(),
        author_name: session.user().username.clone(),
        create_time: Utc::now(),
    };
    post.replies.push(reply.clone());
    store.save_posts(&posts).await?;

    info!("{} replied to post {post_id}", reply.author_name);
    Ok(reply)
}

/// Editable fields of a post as entered in a form.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub is_for_sale: bool,
    pub price: Option<f64>,
    pub sold_content: Option<String>,
}

/// Trimmed, checked post fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub title: String,
    pub content: String,
    pub is_for_sale: bool,
    pub price: Option<f64>,
    pub sold_content: Option<String>,
}

impl PostDraft {
    /// Validates the draft. Price and sold content are only kept for posts
    /// that are for sale.
    pub fn validate(&self) -> Result<ValidDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Invalid::Required("title").into());
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(Invalid::Required("content").into());
        }

        let (price, sold_content) = if self.is_for_sale {
            let price = self.price.filter(|p| *p > 0.0).ok_or(Invalid::NonPositivePrice)?;
            let sold = self
                .sold_content
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or(Invalid::Required("paid content"))?;
            (Some(price), Some(sold.to_string()))
        } else {
            (None, None)
        };

        Ok(ValidDraft {
            title: title.to_string(),
            content: content.to_string(),
            is_for_sale: self.is_for_sale,
            price,
            sold_content,
        })
    }

    /// Builds a new, unpinned post by `author`.
    pub fn into_post(self, author: &User) -> Result<Post> {
        let valid = self.validate()?;
        Ok(Post {
            id: new_record_id(),
            title: valid.title,
            content: valid.content,
            price: valid.price,
            author_id: author.id.clone(),
            author_name: author.username.clone(),
            create_time: Utc::now(),
            pinned_level: PinLevel::None,
            color_tag: None,
            is_for_sale: valid.is_for_sale,
            sold_content: valid.sold_content,
            replies: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::login;
    use crate::memory::MemoryKvStore;
    use chrono::{Duration, TimeZone};
    use tf_core::seed;

    fn post(id: &str, level: PinLevel, minutes: i64) -> Post {
        let mut p = seed::default_posts().remove(0);
        p.id = id.to_string();
        p.pinned_level = level;
        p.create_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        p
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_permanent_pin_beats_newer_posts() {
        let mut posts = vec![
            post("new", PinLevel::None, 500),
            post("admin", PinLevel::Admin, 400),
            post("old-permanent", PinLevel::Permanent, 0),
        ];
        sort_posts(&mut posts);
        assert_eq!(ids(&posts), ["old-permanent", "admin", "new"]);
    }

    #[test]
    fn test_newer_first_within_level() {
        let mut posts = vec![
            post("a", PinLevel::Normal, 10),
            post("b", PinLevel::Normal, 30),
            post("c", PinLevel::None, 50),
            post("d", PinLevel::None, 40),
        ];
        sort_posts(&mut posts);
        assert_eq!(ids(&posts), ["b", "a", "c", "d"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let mut posts = vec![
            post("first", PinLevel::None, 5),
            post("second", PinLevel::None, 5),
            post("third", PinLevel::None, 5),
        ];
        sort_posts(&mut posts);
        assert_eq!(ids(&posts), ["first", "second", "third"]);
    }

    #[test]
    fn test_draft_validation() {
        let base = PostDraft {
            title: "  Camera ".into(),
            content: " body ".into(),
            author_id: "2".into(),
            ..Default::default()
        };
        let valid = base.validate().unwrap();
        assert_eq!(valid.title, "Camera");
        assert_eq!(valid.content, "body");

        let blank = PostDraft { title: "   ".into(), ..base.clone() };
        assert!(matches!(blank.validate(), Err(AppError::ValidationError(Invalid::Required("title")))));

        let no_price = PostDraft { is_for_sale: true, price: Some(0.0), sold_content: Some("x".into()), ..base.clone() };
        assert!(matches!(no_price.validate(), Err(AppError::ValidationError(Invalid::NonPositivePrice))));

        let no_secret = PostDraft { is_for_sale: true, price: Some(5.0), sold_content: Some("  ".into()), ..base.clone() };
        assert!(matches!(no_secret.validate(), Err(AppError::ValidationError(Invalid::Required(_)))));

        let free = PostDraft { price: Some(99.0), sold_content: Some("hidden".into()), ..base };
        let valid = free.validate().unwrap();
        assert_eq!(valid.price, None);
        assert_eq!(valid.sold_content, None);
    }

    #[tokio::test]
    async fn test_list_posts_orders_seed_by_time() {
        let store = ForumStore::new(Box::new(MemoryKvStore::new()));
        let posts = list_posts(&store).await.unwrap();
        assert_eq!(ids(&posts), ["2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn test_add_reply() {
        let store = ForumStore::new(Box::new(MemoryKvStore::new()));
        let session = login(&store, "李四", "123456", "127.0.0.1").await.unwrap();

        let err = add_reply(&store, &session, "2", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(Invalid::Required(_))));

        let reply = add_reply(&store, &session, "2", " still available? ").await.unwrap();
        assert_eq!(reply.content, "still available?");
        assert_eq!(reply.author_id, "3");

        let stored = find_post(&store, "2").await.unwrap();
        assert_eq!(stored.replies, vec![reply]);

        let err = add_reply(&store, &session, "missing", "hi").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Post", _)));
    }
}
