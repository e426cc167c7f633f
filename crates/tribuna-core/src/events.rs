//! Chat events flowing from transport tasks to the UI.

use serde::{Deserialize, Serialize};

/// Events emitted while a query is being answered.
///
/// Transport tasks send these over a channel; the conversation reducer
/// folds them into state. Serializable for logging and fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Incremental response text.
    Delta { text: String },
    /// Response finished; carries the backend thread id when one was issued.
    Completed { thread_id: Option<String> },
    /// Request failed; `message` is a one-line summary for the log.
    Failed { message: String },
}
