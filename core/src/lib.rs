//! Client library for the bookcase catalog service.
//!
//! # Overview
//! Two layers:
//! - [`EntityClient`] builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO). One alias per
//!   entity: [`AuthorClient`], [`BookClient`], [`SeriesClient`],
//!   [`AnthologyClient`], [`MemberClient`], [`StoryClient`].
//! - [`Bookcase`] pairs those builders with a [`Transport`] and exposes
//!   `find`, `find_all`, `insert`, `update` and `delete` per entity.
//!   [`UreqTransport`] is the blocking HTTP implementation.
//!
//! # Design
//! - Clients are stateless; they hold only `base_url`.
//! - Server status codes become typed errors: 400 → [`ApiError::BadRequest`],
//!   404 → [`ApiError::NotFound`], 409 → [`ApiError::NotUnique`].
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{
    AnthologyClient, AuthorClient, BookClient, DevModeClient, EntityClient, MemberClient,
    Resource, SeriesClient, StoryClient,
};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Bookcase, Remote, Transport, UreqTransport};
pub use types::{
    Anthology, Author, AuthorPayload, Book, Location, Member, MemberPayload, Series,
    SeriesPayload, ShelvedPayload, Story, StoryPayload,
};
