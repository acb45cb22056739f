//! Domain DTOs for the bookcase API.
//!
//! # Design
//! These types mirror the server's JSON schema but are defined
//! independently. Integration tests catch any schema drift between the two
//! crates.
//!
//! Records carry the server-owned bookkeeping fields (`id`, `version`,
//! `published`, `updated`). Payloads carry only the editable fields, each
//! optional and omitted from the JSON when `None`, so a caller can send an
//! incomplete payload and get the server's `BadRequest` back. Every payload
//! converts from its record, which makes "fetch, edit, update" a one-liner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a copy of a book or anthology is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub version: i32,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub version: i32,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub author_id: i64,
    pub title: String,
    pub location: Option<Location>,
    pub notes: Option<String>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: i64,
    pub version: i32,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub author_id: i64,
    pub title: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Anthology {
    pub id: i64,
    pub version: i32,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub author_id: i64,
    pub title: String,
    pub location: Option<Location>,
    pub notes: Option<String>,
    pub read: bool,
}

/// A book's place in a series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub version: i32,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub series_id: i64,
    pub book_id: i64,
    pub ordinal: i32,
}

/// A book's place in an anthology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: i64,
    pub version: i32,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub anthology_id: i64,
    pub book_id: i64,
    pub ordinal: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AuthorPayload {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            notes: None,
        }
    }
}

/// Payload for books and anthologies, which share their editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShelvedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl ShelvedPayload {
    pub fn new(author_id: i64, title: &str) -> Self {
        Self {
            author_id: Some(author_id),
            title: Some(title.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SeriesPayload {
    pub fn new(author_id: i64, title: &str) -> Self {
        Self {
            author_id: Some(author_id),
            title: Some(title.to_string()),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i32>,
}

impl MemberPayload {
    pub fn new(series_id: i64, book_id: i64, ordinal: i32) -> Self {
        Self {
            series_id: Some(series_id),
            book_id: Some(book_id),
            ordinal: Some(ordinal),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthology_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i32>,
}

impl StoryPayload {
    pub fn new(anthology_id: i64, book_id: i64, ordinal: i32) -> Self {
        Self {
            anthology_id: Some(anthology_id),
            book_id: Some(book_id),
            ordinal: Some(ordinal),
        }
    }
}

impl From<&Author> for AuthorPayload {
    fn from(author: &Author) -> Self {
        Self {
            first_name: Some(author.first_name.clone()),
            last_name: Some(author.last_name.clone()),
            notes: author.notes.clone(),
        }
    }
}

impl From<&Book> for ShelvedPayload {
    fn from(book: &Book) -> Self {
        Self {
            author_id: Some(book.author_id),
            title: Some(book.title.clone()),
            location: book.location,
            notes: book.notes.clone(),
            read: Some(book.read),
        }
    }
}

impl From<&Anthology> for ShelvedPayload {
    fn from(anthology: &Anthology) -> Self {
        Self {
            author_id: Some(anthology.author_id),
            title: Some(anthology.title.clone()),
            location: anthology.location,
            notes: anthology.notes.clone(),
            read: Some(anthology.read),
        }
    }
}

impl From<&Series> for SeriesPayload {
    fn from(series: &Series) -> Self {
        Self {
            author_id: Some(series.author_id),
            title: Some(series.title.clone()),
            notes: series.notes.clone(),
        }
    }
}

impl From<&Member> for MemberPayload {
    fn from(member: &Member) -> Self {
        Self::new(member.series_id, member.book_id, member.ordinal)
    }
}

impl From<&Story> for StoryPayload {
    fn from(story: &Story) -> Self {
        Self::new(story.anthology_id, story.book_id, story.ordinal)
    }
}
