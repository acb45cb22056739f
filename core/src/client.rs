//! Stateless HTTP request builder and response parser for the bookcase API.
//!
//! # Design
//! `EntityClient<R>` holds only a `base_url` and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! this module deterministic and free of I/O.
//!
//! The five operations are identical for every entity and are written once
//! over the [`Resource`] trait. Filtered listings only make sense for some
//! entities, so they live in entity-specific `impl` blocks.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Anthology, Author, AuthorPayload, Book, Member, MemberPayload, Series, SeriesPayload,
    ShelvedPayload, Story, StoryPayload,
};

/// A record type served under its own collection path.
pub trait Resource: DeserializeOwned {
    /// Collection path segment, e.g. `authors`.
    const PATH: &'static str;
    /// Body sent on insert and update.
    type Payload: Serialize;
}

impl Resource for Author {
    const PATH: &'static str = "authors";
    type Payload = AuthorPayload;
}

impl Resource for Book {
    const PATH: &'static str = "books";
    type Payload = ShelvedPayload;
}

impl Resource for Series {
    const PATH: &'static str = "series";
    type Payload = SeriesPayload;
}

impl Resource for Anthology {
    const PATH: &'static str = "anthologies";
    type Payload = ShelvedPayload;
}

impl Resource for Member {
    const PATH: &'static str = "members";
    type Payload = MemberPayload;
}

impl Resource for Story {
    const PATH: &'static str = "stories";
    type Payload = StoryPayload;
}

pub type AuthorClient = EntityClient<Author>;
pub type BookClient = EntityClient<Book>;
pub type SeriesClient = EntityClient<Series>;
pub type AnthologyClient = EntityClient<Anthology>;
pub type MemberClient = EntityClient<Member>;
pub type StoryClient = EntityClient<Story>;

/// Synchronous, stateless client for one entity of the bookcase API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
pub struct EntityClient<R> {
    base_url: String,
    resource: PhantomData<fn() -> R>,
}

impl<R> Clone for EntityClient<R> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for EntityClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityClient")
            .field("base_url", &self.base_url)
            .field("path", &R::PATH)
            .finish()
    }
}

impl<R: Resource> EntityClient<R> {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, R::PATH)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}/{id}", self.base_url, R::PATH)
    }

    pub fn build_find_all(&self) -> HttpRequest {
        bodiless(HttpMethod::Get, self.collection_url())
    }

    pub fn build_find(&self, id: i64) -> HttpRequest {
        bodiless(HttpMethod::Get, self.item_url(id))
    }

    pub fn build_insert(&self, input: &R::Payload) -> Result<HttpRequest, ApiError> {
        with_json_body(HttpMethod::Post, self.collection_url(), input)
    }

    pub fn build_update(&self, id: i64, input: &R::Payload) -> Result<HttpRequest, ApiError> {
        with_json_body(HttpMethod::Put, self.item_url(id), input)
    }

    pub fn build_delete(&self, id: i64) -> HttpRequest {
        bodiless(HttpMethod::Delete, self.item_url(id))
    }

    /// `GET /{path}?{key}={value}`, with `value` form-url-encoded.
    fn build_find_where(&self, key: &str, value: &str) -> HttpRequest {
        let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
        bodiless(
            HttpMethod::Get,
            format!("{}?{key}={encoded}", self.collection_url()),
        )
    }

    pub fn parse_find_all(&self, response: HttpResponse) -> Result<Vec<R>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_find(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_insert(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

impl EntityClient<Author> {
    /// Authors whose first or last name contains `name`, ignoring case.
    pub fn build_find_by_name(&self, name: &str) -> HttpRequest {
        self.build_find_where("name", name)
    }
}

impl EntityClient<Book> {
    pub fn build_find_by_author_id(&self, author_id: i64) -> HttpRequest {
        self.build_find_where("authorId", &author_id.to_string())
    }
}

impl EntityClient<Series> {
    pub fn build_find_by_author_id(&self, author_id: i64) -> HttpRequest {
        self.build_find_where("authorId", &author_id.to_string())
    }
}

impl EntityClient<Anthology> {
    pub fn build_find_by_author_id(&self, author_id: i64) -> HttpRequest {
        self.build_find_where("authorId", &author_id.to_string())
    }
}

impl EntityClient<Member> {
    /// Members of one series, in ordinal order.
    pub fn build_find_by_series_id(&self, series_id: i64) -> HttpRequest {
        self.build_find_where("seriesId", &series_id.to_string())
    }

    pub fn build_find_by_book_id(&self, book_id: i64) -> HttpRequest {
        self.build_find_where("bookId", &book_id.to_string())
    }
}

impl EntityClient<Story> {
    /// Stories of one anthology, in ordinal order.
    pub fn build_find_by_anthology_id(&self, anthology_id: i64) -> HttpRequest {
        self.build_find_where("anthologyId", &anthology_id.to_string())
    }

    pub fn build_find_by_book_id(&self, book_id: i64) -> HttpRequest {
        self.build_find_where("bookId", &book_id.to_string())
    }
}

/// Builder and parser for the server's `/devmode` routes.
#[derive(Debug, Clone)]
pub struct DevModeClient {
    base_url: String,
}

impl DevModeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Replace the catalog with the server's sample data.
    pub fn build_populate(&self) -> HttpRequest {
        bodiless(HttpMethod::Post, format!("{}/devmode/populate", self.base_url))
    }

    /// Remove every record.
    pub fn build_depopulate(&self) -> HttpRequest {
        bodiless(HttpMethod::Post, format!("{}/devmode/depopulate", self.base_url))
    }

    pub fn parse_reset(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

fn bodiless(method: HttpMethod, path: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn with_json_body<T: Serialize>(
    method: HttpMethod,
    path: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body =
        serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The server's error message, or the raw body when it is not the JSON
/// error envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        400 => Err(ApiError::BadRequest(error_message(&response.body))),
        404 => Err(ApiError::NotFound(error_message(&response.body))),
        409 => Err(ApiError::NotUnique(error_message(&response.body))),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
