//! UI event types consumed by the reducer.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tribuna_core::events::ChatEvent;

/// Events processed by the reducer each frame.
pub enum UiEvent {
    /// Periodic tick; drives the spinner and caps the render rate.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// Transport event from the request task, tagged with its generation.
    Chat { generation: u64, event: ChatEvent },
    /// A request task was spawned; the reducer stores the channel.
    StreamStarted {
        generation: u64,
        rx: mpsc::UnboundedReceiver<ChatEvent>,
        cancel: CancellationToken,
    },
}
