//! HTTP client for the platform-analysis backend.
//!
//! Two request shapes against the same backend: `search` does one JSON
//! round trip, `search_stream` decodes a chunked `data:` line stream.

mod sse;
pub mod types;

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde_json::Value;

use crate::config::Config;
use crate::conversation::Mode;

pub use sse::EventLineDecoder;
pub use types::{SearchRequest, SearchResponse, StreamEvent};

/// Boxed stream of decoded events from `/search/stream`.
pub type EventStream = BoxStream<'static, std::result::Result<StreamEvent, ClientError>>;

/// Categories of backend request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// Non-2xx HTTP status.
    Http,
    /// Request or connect timeout.
    Timeout,
    /// Could not reach the backend.
    Connect,
    /// Response body could not be decoded.
    Parse,
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErrorKind::Http => write!(f, "http"),
            ClientErrorKind::Timeout => write!(f, "timeout"),
            ClientErrorKind::Connect => write!(f, "connect"),
            ClientErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured backend error with category and one-line summary.
#[derive(Debug, Clone)]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error from a non-2xx response, extracting the FastAPI
    /// `detail` field from the body when present.
    fn http_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("detail")
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
            });
        let message = match detail {
            Some(detail) => format!("HTTP {status}: {detail}"),
            None => format!("HTTP {status}"),
        };
        Self::new(ClientErrorKind::Http, message)
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ClientErrorKind::Timeout
        } else if err.is_decode() {
            ClientErrorKind::Parse
        } else {
            ClientErrorKind::Connect
        };
        Self::new(kind, err.to_string())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClientError {}

/// Client for the analysis backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Builds a client from the loaded configuration.
    ///
    /// # Errors
    /// Returns an error when the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.resolve_base_url()?;
        Self::new(base_url, config.request_timeout())
    }

    /// Builds a client against an explicit base URL.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.into();
        guard_production_url(&base_url);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One-shot query against `POST /search`.
    ///
    /// # Errors
    /// Returns a classified [`ClientError`] on transport failure, non-2xx
    /// status, or an undecodable body.
    pub async fn search(
        &self,
        query: &str,
        mode: Mode,
        thread_id: Option<&str>,
    ) -> std::result::Result<SearchResponse, ClientError> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!(%url, mode = mode.as_str(), "sending search request");

        let response = self
            .http
            .post(&url)
            .json(&SearchRequest {
                query,
                mode,
                thread_id,
            })
            .send()
            .await
            .map_err(|err| ClientError::from_reqwest(&err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::http_status(status.as_u16(), &body));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|err| ClientError::new(ClientErrorKind::Parse, err.to_string()))
    }

    /// Streaming query against `POST /search/stream`.
    ///
    /// Returns a stream of decoded events; the caller stops reading after
    /// the first [`StreamEvent::Done`].
    ///
    /// # Errors
    /// Returns a classified [`ClientError`] when the request cannot be sent
    /// or the backend answers with a non-2xx status.
    pub async fn search_stream(
        &self,
        query: &str,
        mode: Mode,
        thread_id: Option<&str>,
    ) -> std::result::Result<EventStream, ClientError> {
        let url = format!("{}/search/stream", self.base_url);
        tracing::debug!(%url, mode = mode.as_str(), "opening search stream");

        let response = self
            .http
            .post(&url)
            .json(&SearchRequest {
                query,
                mode,
                thread_id,
            })
            .send()
            .await
            .map_err(|err| ClientError::from_reqwest(&err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::http_status(status.as_u16(), &body));
        }

        Ok(EventLineDecoder::new(response.bytes_stream()).boxed())
    }
}

/// Panics when a test or a guarded environment points at the production
/// backend. Tests must talk to a local mock.
fn guard_production_url(base_url: &str) {
    let blocked = cfg!(test)
        || std::env::var("TRIBUNA_BLOCK_REAL_API").is_ok_and(|value| value == "1");
    if blocked && base_url.contains("political-discourse-analyzer-production") {
        panic!("Refusing to touch the production backend from a test: {base_url}");
    }
}
