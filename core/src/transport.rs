//! Executing requests, and a blocking facade that pairs every builder with
//! its parser.
//!
//! # Design
//! `EntityClient` never touches the network. A [`Transport`] turns an
//! `HttpRequest` into an `HttpResponse`; [`UreqTransport`] does so over real
//! HTTP. [`Bookcase`] combines the two so callers can write
//! `bookcase.authors().find(id)` instead of driving build/execute/parse by
//! hand.

use crate::client::{DevModeClient, EntityClient, Resource};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Anthology, Author, Book, Member, Series, Story};

/// Executes one HTTP round-trip.
///
/// Implementations must return 4xx and 5xx responses as `Ok` data so that
/// the parsers can map them; `Err` is reserved for failures that produced
/// no response at all.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are interpreted by the parsers, not by ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            headers,
            body,
        } = request;
        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&path), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&path), &headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(&path), &headers), body),
            HttpMethod::Put => send(with_headers(self.agent.put(&path), &headers), body),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        tracing::debug!(%method, %path, status, "bookcase round-trip");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Blocking client for the whole bookcase API.
#[derive(Debug, Clone)]
pub struct Bookcase<T> {
    base_url: String,
    transport: T,
}

impl Bookcase<UreqTransport> {
    /// Client that talks to `base_url` over HTTP.
    pub fn connect(base_url: &str) -> Self {
        Self::new(base_url, UreqTransport::new())
    }
}

impl<T: Transport> Bookcase<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.to_string(),
            transport,
        }
    }

    fn remote<R: Resource>(&self) -> Remote<'_, R, T> {
        Remote {
            client: EntityClient::new(&self.base_url),
            transport: &self.transport,
        }
    }

    pub fn authors(&self) -> Remote<'_, Author, T> {
        self.remote()
    }

    pub fn books(&self) -> Remote<'_, Book, T> {
        self.remote()
    }

    pub fn series(&self) -> Remote<'_, Series, T> {
        self.remote()
    }

    pub fn anthologies(&self) -> Remote<'_, Anthology, T> {
        self.remote()
    }

    pub fn members(&self) -> Remote<'_, Member, T> {
        self.remote()
    }

    pub fn stories(&self) -> Remote<'_, Story, T> {
        self.remote()
    }

    /// Replace the catalog with the sample data. Needs a server in dev mode.
    pub fn populate(&self) -> Result<(), ApiError> {
        let devmode = DevModeClient::new(&self.base_url);
        devmode.parse_reset(self.transport.execute(devmode.build_populate())?)
    }

    /// Remove every record. Needs a server in dev mode.
    pub fn depopulate(&self) -> Result<(), ApiError> {
        let devmode = DevModeClient::new(&self.base_url);
        devmode.parse_reset(self.transport.execute(devmode.build_depopulate())?)
    }
}

/// One entity's operations, executed through a borrowed transport.
pub struct Remote<'a, R, T> {
    client: EntityClient<R>,
    transport: &'a T,
}

impl<R: Resource, T: Transport> Remote<'_, R, T> {
    pub fn find(&self, id: i64) -> Result<R, ApiError> {
        let response = self.transport.execute(self.client.build_find(id))?;
        self.client.parse_find(response)
    }

    pub fn find_all(&self) -> Result<Vec<R>, ApiError> {
        self.list(self.client.build_find_all())
    }

    pub fn insert(&self, input: &R::Payload) -> Result<R, ApiError> {
        let response = self.transport.execute(self.client.build_insert(input)?)?;
        self.client.parse_insert(response)
    }

    pub fn update(&self, id: i64, input: &R::Payload) -> Result<R, ApiError> {
        let response = self.transport.execute(self.client.build_update(id, input)?)?;
        self.client.parse_update(response)
    }

    pub fn delete(&self, id: i64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete(id))?;
        self.client.parse_delete(response)
    }

    fn list(&self, request: HttpRequest) -> Result<Vec<R>, ApiError> {
        self.client.parse_find_all(self.transport.execute(request)?)
    }
}

impl<T: Transport> Remote<'_, Author, T> {
    pub fn find_by_name(&self, name: &str) -> Result<Vec<Author>, ApiError> {
        self.list(self.client.build_find_by_name(name))
    }
}

impl<T: Transport> Remote<'_, Book, T> {
    pub fn find_by_author_id(&self, author_id: i64) -> Result<Vec<Book>, ApiError> {
        self.list(self.client.build_find_by_author_id(author_id))
    }
}

impl<T: Transport> Remote<'_, Series, T> {
    pub fn find_by_author_id(&self, author_id: i64) -> Result<Vec<Series>, ApiError> {
        self.list(self.client.build_find_by_author_id(author_id))
    }
}

impl<T: Transport> Remote<'_, Anthology, T> {
    pub fn find_by_author_id(&self, author_id: i64) -> Result<Vec<Anthology>, ApiError> {
        self.list(self.client.build_find_by_author_id(author_id))
    }
}

impl<T: Transport> Remote<'_, Member, T> {
    pub fn find_by_series_id(&self, series_id: i64) -> Result<Vec<Member>, ApiError> {
        self.list(self.client.build_find_by_series_id(series_id))
    }

    pub fn find_by_book_id(&self, book_id: i64) -> Result<Vec<Member>, ApiError> {
        self.list(self.client.build_find_by_book_id(book_id))
    }
}

impl<T: Transport> Remote<'_, Story, T> {
    pub fn find_by_anthology_id(&self, anthology_id: i64) -> Result<Vec<Story>, ApiError> {
        self.list(self.client.build_find_by_anthology_id(anthology_id))
    }

    pub fn find_by_book_id(&self, book_id: i64) -> Result<Vec<Story>, ApiError> {
        self.list(self.client.build_find_by_book_id(book_id))
    }
}
