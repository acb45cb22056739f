//! REST service for the bookcase catalog.
//!
//! # Overview
//! Authors own books, series and anthologies. A series lists its member
//! books in order, and an anthology lists the books it collects as stories.
//! Every entity is exposed through the same five routes:
//!
//! | method   | path               | success |
//! |----------|--------------------|---------|
//! | `GET`    | `/{entity}`        | 200     |
//! | `GET`    | `/{entity}/{id}`   | 200     |
//! | `POST`   | `/{entity}`        | 201     |
//! | `PUT`    | `/{entity}/{id}`   | 200     |
//! | `DELETE` | `/{entity}/{id}`   | 204     |
//!
//! Validation failures answer 400, unknown ids 404 and duplicate natural
//! keys 409. When [`Config::devmode`] is set, `POST /devmode/populate` and
//! `POST /devmode/depopulate` reset the catalog for test suites.
//!
//! # Design
//! State is a single [`Library`] behind a tokio `RwLock`. Records are kept
//! only in memory.

pub mod error;
pub mod model;
mod routes;
pub mod seed;
pub mod store;

use std::sync::Arc;

use axum::Router;
use tokio::{net::TcpListener, sync::RwLock};

pub use error::ApiError;
pub use model::{
    Anthology, Author, AuthorPayload, Book, Location, Member, MemberPayload, Series,
    SeriesPayload, ShelvedPayload, Stamp, Story, StoryPayload,
};
pub use store::{Entity, Library};

pub type Db = Arc<RwLock<Library>>;

#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// Mount the `/devmode` routes.
    pub devmode: bool,
}

/// Router over an empty catalog with dev mode off.
pub fn app() -> Router {
    app_with_config(Config::default())
}

pub fn app_with_config(config: Config) -> Router {
    app_with_library(config, Library::new())
}

pub fn app_with_library(config: Config, library: Library) -> Router {
    let db: Db = Arc::new(RwLock::new(library));
    let mut router = Router::new();
    router = routes::resource::<Author>(router);
    router = routes::resource::<Book>(router);
    router = routes::resource::<Series>(router);
    router = routes::resource::<Anthology>(router);
    router = routes::resource::<Member>(router);
    router = routes::resource::<Story>(router);
    if config.devmode {
        router = routes::devmode(router);
    }
    router.with_state(db)
}

pub async fn run(listener: TcpListener, config: Config) -> Result<(), std::io::Error> {
    serve(listener, app_with_config(config)).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "bookcase listening");
    }
    axum::serve(listener, app).await
}
