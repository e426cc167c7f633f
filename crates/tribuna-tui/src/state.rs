//! Application state composition.
//!
//! `AppState` combines `TuiState` (transcript, input, stream) with
//! `Option<Overlay>` so overlay handling and the main view never fight
//! over borrows. All mutation happens in the reducer (`update`).

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tribuna_core::config::Delivery;
use tribuna_core::conversation::{Conversation, Mode};
use tribuna_core::events::ChatEvent;

use crate::input::InputState;
use crate::suggestions::SuggestionState;

/// Modal overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// One-time legal notice, shown until acknowledged.
    LegalNotice,
}

/// State of the in-flight backend request, if any.
pub enum StreamState {
    /// No request running.
    Idle,
    /// A request task is streaming events into `rx`.
    Active {
        rx: mpsc::UnboundedReceiver<ChatEvent>,
        generation: u64,
        cancel: CancellationToken,
    },
}

impl StreamState {
    pub fn is_active(&self) -> bool {
        !matches!(self, StreamState::Idle)
    }
}

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(mode: Mode, delivery: Delivery, notice_acknowledged: bool) -> Self {
        Self {
            tui: TuiState::new(mode, delivery),
            overlay: (!notice_acknowledged).then_some(Overlay::LegalNotice),
        }
    }
}

/// TUI application state (non-overlay).
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Chat transcript and turn state.
    pub conversation: Conversation,
    /// User input box.
    pub input: InputState,
    /// Suggested-question selection (empty transcript only).
    pub suggestions: SuggestionState,
    /// In-flight request state.
    pub stream: StreamState,
    /// Delivery shape for new requests.
    pub delivery: Delivery,
    /// Spinner animation frame, advanced on ticks while pending.
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new(mode: Mode, delivery: Delivery) -> Self {
        Self {
            should_quit: false,
            conversation: Conversation::new(mode),
            input: InputState::default(),
            suggestions: SuggestionState::default(),
            stream: StreamState::Idle,
            delivery,
            spinner_frame: 0,
        }
    }
}
