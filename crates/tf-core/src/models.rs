//! # Domain Models
//!
//! These structs represent the core entities of the trading forum.
//! New records get UUID v7 ids, which are derived from the creation time.
//! Persisted JSON keeps the camelCase field names of the stored collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a time-ordered id for a freshly created record.
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}

/// Timestamp fields of persisted records.
///
/// Writes RFC 3339. Reads RFC 3339 and the local-time layouts found in
/// older profiles (`2024-01-01 10:00:00`, `2024/1/20 15:30:00`,
/// `1/20/2024, 3:30:00 PM`), which carry no offset and are taken as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const LEGACY_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%m/%d/%Y, %I:%M:%S %p"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            return Some(t.with_timezone(&Utc));
        }
        LEGACY_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("unrecognized timestamp {raw:?}")))
    }
}

/// A registered forum account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Stored as entered; the forum has no real credential security.
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(with = "timestamp")]
    pub register_time: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub last_login_time: DateTime<Utc>,
    #[serde(rename = "loginIP")]
    pub login_ip: String,
    pub points: i64,
    pub is_admin: bool,
    pub is_active: bool,
}

/// Placement priority of a post in the listing.
///
/// Persisted as the integer `pinnedLevel` (0..=3). Whether a post counts as
/// pinned is derived from the level, so the two can never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PinLevel {
    #[default]
    None = 0,
    Normal = 1,
    Admin = 2,
    Permanent = 3,
}

impl PinLevel {
    pub fn is_pinned(self) -> bool {
        self != PinLevel::None
    }
}

impl TryFrom<u8> for PinLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(PinLevel::None),
            1 => Ok(PinLevel::Normal),
            2 => Ok(PinLevel::Admin),
            3 => Ok(PinLevel::Permanent),
            other => Err(format!("pinned level {other} is outside 0..=3")),
        }
    }
}

impl From<PinLevel> for u8 {
    fn from(level: PinLevel) -> Self {
        level as u8
    }
}

/// Visual grouping marker. Has no behavioral effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Red,
    Blue,
    Green,
    Yellow,
}

/// A forum thread opener, optionally selling hidden content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Asking price shown next to the listing, unrelated to the unlock cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Weak reference to `User::id`; not enforced.
    pub author_id: String,
    pub author_name: String,
    #[serde(with = "timestamp")]
    pub create_time: DateTime<Utc>,
    #[serde(default)]
    pub pinned_level: PinLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_tag: Option<ColorTag>,
    pub is_for_sale: bool,
    /// Hidden from viewers until they hold a purchase marker for this post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_content: Option<String>,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Post {
    pub fn is_pinned(&self) -> bool {
        self.pinned_level.is_pinned()
    }
}

/// A reply stored inline in its post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    #[serde(with = "timestamp")]
    pub create_time: DateTime<Utc>,
}
