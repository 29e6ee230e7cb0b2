//! # Chat
//!
//! The chat screen is a local mock: contacts and threads live in memory for
//! the lifetime of a [`ChatBook`] and are never persisted or delivered.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tf_core::error::{AppError, Invalid, Result};
use tf_core::models::new_record_id;

use crate::session::Session;

/// Largest image accepted as an attachment (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
/// Preview text shown for a contact whose last message is an image.
pub const IMAGE_PREVIEW: &str = "[image]";

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Text(String),
    Image { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub body: MessageBody,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub is_online: bool,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub unread_count: u32,
}

/// A local image picked for sending.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub content_type: String,
    pub size: u64,
    /// Data URL or location of the picked file.
    pub url: String,
}

pub struct ChatBook {
    me: (String, String),
    contacts: Vec<Contact>,
    threads: HashMap<String, Vec<ChatMessage>>,
}

impl ChatBook {
    /// An empty book for the session user.
    pub fn new(session: &Session) -> Self {
        Self {
            me: (session.user_id().to_string(), session.user().username.clone()),
            contacts: Vec::new(),
            threads: HashMap::new(),
        }
    }

    /// A book pre-filled with three conversations about seed listings.
    pub fn demo(session: &Session) -> Self {
        let mut book = Self::new(session);
        let now = Utc::now();
        let me = book.me.clone();

        let mut script = |id: &str, name: &str, online: bool, unread: u32, lines: &[(bool, MessageBody, i64)]| {
            let thread: Vec<ChatMessage> = lines
                .iter()
                .map(|(mine, body, minutes_ago)| {
                    let (sender_id, sender_name) = if *mine { me.clone() } else { (id.to_string(), name.to_string()) };
                    ChatMessage {
                        id: new_record_id(),
                        sender_id,
                        sender_name,
                        body: body.clone(),
                        sent_at: now - Duration::minutes(*minutes_ago),
                    }
                })
                .collect();
            let last = thread.last();
            book.contacts.push(Contact {
                id: id.to_string(),
                username: name.to_string(),
                avatar: format!("/avatars/{id}.png"),
                is_online: online,
                last_message: last.map(|m| preview(&m.body)),
                last_message_time: last.map(|m| m.sent_at),
                unread_count: unread,
            });
            book.threads.insert(id.to_string(), thread);
        };

        let text = |s: &str| MessageBody::Text(s.to_string());
        script("2", "张三", true, 2, &[
            (false, text("你好，MacBook还在吗？"), 60),
            (true, text("在的，需要看详细图片吗"), 58),
            (true, MessageBody::Image { url: "/uploads/macbook.jpg".into() }, 57),
            (false, text("好的，我看看"), 0),
        ]);
        script("3", "李四", false, 0, &[
            (false, text("小米手机的照片能发一下吗"), 24 * 60 + 10),
            (true, MessageBody::Image { url: "/uploads/xiaomi.jpg".into() }, 24 * 60 + 5),
            (false, text("图片收到了"), 24 * 60),
        ]);
        script("4", "王五", true, 1, &[
            (false, text("Switch还有吗？"), 80),
            (true, text("有的，要的话可以优惠一点"), 75),
            (false, text("这个价格可以商量吗？"), 70),
        ]);
        book
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn add_contact(&mut self, contact: Contact) {
        self.threads.entry(contact.id.clone()).or_default();
        self.contacts.push(contact);
    }

    fn contact_mut(&mut self, contact_id: &str) -> Result<&mut Contact> {
        self.contacts
            .iter_mut()
            .find(|c| c.id == contact_id)
            .ok_or_else(|| AppError::NotFound("Contact", contact_id.to_string()))
    }

    /// Opens a conversation, marking it read.
    pub fn open(&mut self, contact_id: &str) -> Result<&[ChatMessage]> {
        self.contact_mut(contact_id)?.unread_count = 0;
        Ok(self.threads.get(contact_id).map(Vec::as_slice).unwrap_or_default())
    }

    fn push(&mut self, contact_id: &str, body: MessageBody) -> Result<&ChatMessage> {
        let sent_at = Utc::now();
        let contact = self.contact_mut(contact_id)?;
        contact.last_message = Some(preview(&body));
        contact.last_message_time = Some(sent_at);

        let message = ChatMessage {
            id: new_record_id(),
            sender_id: self.me.0.clone(),
            sender_name: self.me.1.clone(),
            body,
            sent_at,
        };
        let thread = self.threads.entry(contact_id.to_string()).or_default();
        thread.push(message);
        Ok(&thread[thread.len() - 1])
    }

    pub fn send_text(&mut self, contact_id: &str, text: &str) -> Result<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Invalid::Required("message").into());
        }
        self.push(contact_id, MessageBody::Text(text.to_string()))
    }

    pub fn send_image(&mut self, contact_id: &str, image: ImageAttachment) -> Result<&ChatMessage> {
        let is_image = image
            .content_type
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(Invalid::NotAnImage.into());
        }
        if image.size > MAX_IMAGE_BYTES {
            return Err(Invalid::ImageTooLarge { max: MAX_IMAGE_BYTES }.into());
        }
        self.push(contact_id, MessageBody::Image { url: image.url })
    }
}

fn preview(body: &MessageBody) -> String {
    match body {
        MessageBody::Text(t) => t.clone(),
        MessageBody::Image { .. } => IMAGE_PREVIEW.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::login;
    use crate::memory::MemoryKvStore;
    use crate::store::ForumStore;

    async fn demo_book() -> ChatBook {
        let store = ForumStore::new(Box::new(MemoryKvStore::new()));
        let session = login(&store, "admin", "admin123", "127.0.0.1").await.unwrap();
        ChatBook::demo(&session)
    }

    fn image(content_type: &str, size: u64) -> ImageAttachment {
        ImageAttachment { content_type: content_type.into(), size, url: "data:image/png;base64,AAAA".into() }
    }

    #[tokio::test]
    async fn test_demo_contacts() {
        let book = demo_book().await;
        let contacts = book.contacts();
        assert_eq!(contacts.len(), 3);
        assert_eq!(contacts[0].unread_count, 2);
        assert_eq!(contacts[0].last_message.as_deref(), Some("好的，我看看"));
        assert_eq!(contacts[1].last_message.as_deref(), Some("图片收到了"));
    }

    #[tokio::test]
    async fn test_open_clears_unread() {
        let mut book = demo_book().await;
        let thread = book.open("2").unwrap();
        assert_eq!(thread.len(), 4);
        assert!(matches!(thread[2].body, MessageBody::Image { .. }));
        assert_eq!(thread[1].sender_id, "1");
        assert_eq!(book.contacts()[0].unread_count, 0);

        assert!(matches!(book.open("99"), Err(AppError::NotFound("Contact", _))));
    }

    #[tokio::test]
    async fn test_send_text_updates_preview() {
        let mut book = demo_book().await;
        assert!(matches!(book.send_text("4", "   "), Err(AppError::ValidationError(Invalid::Required(_)))));

        let sent = book.send_text("4", " 900 ok? ").unwrap().clone();
        assert_eq!(sent.body, MessageBody::Text("900 ok?".into()));
        assert_eq!(sent.sender_name, "admin");
        let contact = &book.contacts()[2];
        assert_eq!(contact.last_message.as_deref(), Some("900 ok?"));
        assert_eq!(contact.last_message_time, Some(sent.sent_at));
        assert_eq!(book.open("4").unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_send_image_checks_type_and_size() {
        let mut book = demo_book().await;
        assert!(matches!(
            book.send_image("3", image("application/pdf", 10)),
            Err(AppError::ValidationError(Invalid::NotAnImage))
        ));
        assert!(matches!(
            book.send_image("3", image("not a mime", 10)),
            Err(AppError::ValidationError(Invalid::NotAnImage))
        ));
        assert!(matches!(
            book.send_image("3", image("image/png", MAX_IMAGE_BYTES + 1)),
            Err(AppError::ValidationError(Invalid::ImageTooLarge { .. }))
        ));

        book.send_image("3", image("image/jpeg", MAX_IMAGE_BYTES)).unwrap();
        assert_eq!(book.contacts()[1].last_message.as_deref(), Some(IMAGE_PREVIEW));
    }
}
