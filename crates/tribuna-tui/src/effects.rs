//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer stays pure and
//! never performs I/O itself.

use tokio_util::sync::CancellationToken;
use tribuna_core::config::Delivery;
use tribuna_core::conversation::Mode;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Spawn a backend request task for an opened turn.
    SendQuery {
        query: String,
        mode: Mode,
        thread_id: Option<String>,
        generation: u64,
        delivery: Delivery,
    },

    /// Cancel the in-flight request task.
    CancelStream { cancel: CancellationToken },

    /// Persist the legal-notice acknowledgement.
    AcknowledgeNotice,
}
