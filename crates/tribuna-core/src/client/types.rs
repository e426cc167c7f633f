//! Wire types for the `/search` and `/search/stream` endpoints.

use serde::{Deserialize, Serialize};

use crate::conversation::Mode;

/// Request body shared by both endpoints.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub mode: Mode,
    pub thread_id: Option<&'a str>,
}

/// Batch response from `POST /search`.
///
/// Every field is optional on the wire; a missing or null `response` is a
/// backend fault the caller substitutes an apology for. `citations` exists
/// in the backend schema but is not displayed.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub citations: Vec<String>,
}

/// One decoded event from the streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Incremental response text.
    Token { content: String },
    /// Stream finished; carries the thread id when the backend issued one.
    Done {
        #[serde(default)]
        thread_id: Option<String>,
    },
}
