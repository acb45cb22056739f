//! Persisted records, request payloads and listing filters.
//!
//! # Design
//! Stored records and incoming payloads are separate types. Payload fields
//! are all optional so that a missing required field reaches validation and
//! is reported as a 400 with a field-specific message, instead of being
//! rejected by the JSON decoder. Bookkeeping fields (`id`, `version`,
//! `published`, `updated`) live in [`Stamp`] and are owned by the store;
//! any values a client sends for them are ignored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping fields shared by every record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub id: i64,
    pub version: i32,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Stamp {
    pub fn new(id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            version: 0,
            published: now,
            updated: now,
        }
    }

    /// The stamp a record carries after one more successful update.
    ///
    /// `updated` always moves forward, even when two writes land within the
    /// resolution of the clock.
    pub fn bumped(&self, now: DateTime<Utc>) -> Self {
        let updated = if now > self.updated {
            now
        } else {
            self.updated + Duration::milliseconds(1)
        };
        Self {
            id: self.id,
            version: self.version + 1,
            published: self.published,
            updated,
        }
    }
}

/// Where a physical or electronic copy lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Location {
    Audible,
    Kindle,
    Kobo,
    Library,
    Other,
    Paperback,
    Hardcover,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub first_name: String,
    pub last_name: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub author_id: i64,
    pub title: String,
    pub location: Option<Location>,
    pub notes: Option<String>,
    pub read: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub author_id: i64,
    pub title: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anthology {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub author_id: i64,
    pub title: String,
    pub location: Option<Location>,
    pub notes: Option<String>,
    pub read: bool,
}

/// A book's position within a series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub series_id: i64,
    pub book_id: i64,
    pub ordinal: i32,
}

/// A book's position within an anthology.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(flatten)]
    pub stamp: Stamp,
    pub anthology_id: i64,
    pub book_id: i64,
    pub ordinal: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthorPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub notes: Option<String>,
}

/// Body accepted for both books and anthologies.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShelvedPayload {
    pub author_id: Option<i64>,
    pub title: Option<String>,
    pub location: Option<Location>,
    pub notes: Option<String>,
    pub read: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesPayload {
    pub author_id: Option<i64>,
    pub title: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberPayload {
    pub series_id: Option<i64>,
    pub book_id: Option<i64>,
    pub ordinal: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoryPayload {
    pub anthology_id: Option<i64>,
    pub book_id: Option<i64>,
    pub ordinal: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorFilter {
    /// Case-insensitive substring of either the first or the last name.
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OwnerFilter {
    pub author_id: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberFilter {
    pub series_id: Option<i64>,
    pub book_id: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoryFilter {
    pub anthology_id: Option<i64>,
    pub book_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn author_serializes_flat_camel_case() {
        let author = Author {
            stamp: Stamp::new(3, at(0)),
            first_name: "Fred".to_string(),
            last_name: "Flintstone".to_string(),
            notes: None,
        };
        let json = serde_json::to_value(&author).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["version"], 0);
        assert_eq!(json["firstName"], "Fred");
        assert_eq!(json["lastName"], "Flintstone");
        assert!(json["notes"].is_null());
        assert!(json.get("stamp").is_none());
    }

    #[test]
    fn bumped_increments_version_and_keeps_published() {
        let stamp = Stamp::new(1, at(100));
        let next = stamp.bumped(at(200));
        assert_eq!(next.id, 1);
        assert_eq!(next.version, 1);
        assert_eq!(next.published, at(100));
        assert_eq!(next.updated, at(200));
    }

    #[test]
    fn bumped_moves_forward_when_clock_stalls() {
        let stamp = Stamp::new(1, at(100));
        let next = stamp.bumped(at(100));
        assert!(next.updated > stamp.updated);
        let again = next.bumped(at(50));
        assert!(again.updated > next.updated);
        assert_eq!(again.version, 2);
    }

    #[test]
    fn payload_ignores_bookkeeping_fields() {
        let payload: AuthorPayload = serde_json::from_str(
            r#"{"id":99,"version":4,"firstName":"Wilma","lastName":"Flintstone"}"#,
        )
        .unwrap();
        assert_eq!(payload.first_name.as_deref(), Some("Wilma"));
        assert!(payload.notes.is_none());
    }

    #[test]
    fn empty_payload_decodes_to_all_none() {
        let payload: ShelvedPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.author_id.is_none());
        assert!(payload.title.is_none());
        assert!(payload.read.is_none());
    }

    #[test]
    fn location_uses_screaming_snake_case() {
        let json = serde_json::to_string(&Location::Paperback).unwrap();
        assert_eq!(json, r#""PAPERBACK""#);
        let back: Location = serde_json::from_str(r#""KINDLE""#).unwrap();
        assert_eq!(back, Location::Kindle);
        assert!(serde_json::from_str::<Location>(r#""SCROLL""#).is_err());
    }
}
