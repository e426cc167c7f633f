//! Conversation state and the stream-ingestion reducer.
//!
//! All mutation goes through [`Conversation`]: `begin_turn` opens a user
//! turn, `apply` folds transport events into the trailing assistant
//! message, `reset` clears everything. Events are tagged with a generation
//! counter so chunks from a superseded request never touch fresh state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::ChatEvent;

/// Apology shown when the backend answers with an unusable response body.
pub const APOLOGY_BAD_RESPONSE: &str = "Lo siento, hubo un error al procesar tu pregunta.";

/// Apology shown when the request itself fails (timeout, refused, non-2xx).
pub const APOLOGY_TRANSPORT: &str =
    "Lo siento, ocurrió un error al comunicarse con el servidor.";

/// Backend routing hint carried on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Answers grounded strictly in published party platforms.
    #[default]
    Neutral,
    /// Answers adapted to the user's situation.
    Personal,
}

impl Mode {
    /// Wire name, as sent in request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Neutral => "neutral",
            Mode::Personal => "personal",
        }
    }

    /// Header subtitle shown in the UI for this mode.
    pub fn subtitle(self) -> &'static str {
        match self {
            Mode::Neutral => "Consulta Programática",
            Mode::Personal => "Diálogo Personalizado",
        }
    }

    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            Mode::Neutral => Mode::Personal,
            Mode::Personal => Mode::Neutral,
        }
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    fn assistant_open() -> Self {
        Self {
            text: String::new(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
        }
    }
}

/// Lifecycle of the trailing assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    /// No open assistant message.
    #[default]
    Closed,
    /// Turn opened, no content received yet.
    AwaitingFirstToken,
    /// At least one token folded in.
    Accumulating,
}

/// Chat transcript plus the state needed to drive one turn at a time.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    thread_id: Option<String>,
    mode: Mode,
    pending: bool,
    generation: u64,
    phase: StreamPhase,
}

impl Conversation {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True while a turn is open and awaiting transport events.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Current request generation. Events tagged with anything else are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens a new turn for `text`.
    ///
    /// Appends the user message plus an empty assistant message and returns
    /// the generation the transport task must tag its events with. Returns
    /// `None` without touching state when `text` is blank or a turn is
    /// already pending.
    pub fn begin_turn(&mut self, text: &str) -> Option<u64> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.pending {
            return None;
        }

        self.messages.push(Message::user(trimmed));
        self.messages.push(Message::assistant_open());
        self.pending = true;
        self.phase = StreamPhase::AwaitingFirstToken;
        self.generation += 1;
        Some(self.generation)
    }

    /// Folds one transport event into the open turn.
    ///
    /// Events carrying a stale generation are dropped. Events arriving with
    /// the current generation but no open turn are dropped too (a `Completed`
    /// after `Failed` already closed the turn, for instance).
    pub fn apply(&mut self, generation: u64, event: ChatEvent) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping stale chat event"
            );
            return;
        }
        if !self.pending {
            return;
        }

        match event {
            ChatEvent::Delta { text } => self.fold_token(&text),
            ChatEvent::Completed { thread_id } => {
                if self.thread_id.is_none()
                    && let Some(id) = thread_id.filter(|id| !id.is_empty())
                {
                    self.thread_id = Some(id);
                }
                if self.phase == StreamPhase::AwaitingFirstToken
                    && let Some(open) = self.open_message()
                    && open.text.is_empty()
                {
                    open.text = APOLOGY_BAD_RESPONSE.to_string();
                }
                self.close_turn();
            }
            ChatEvent::Failed { message } => {
                tracing::warn!(error = %message, "chat request failed");
                if let Some(open) = self.open_message() {
                    open.text = APOLOGY_TRANSPORT.to_string();
                }
                self.close_turn();
            }
        }
    }

    /// Clears the transcript and thread id and invalidates in-flight events.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.thread_id = None;
        self.pending = false;
        self.phase = StreamPhase::Closed;
        self.generation += 1;
    }

    /// Changes the mode for subsequent turns. In-flight requests keep the
    /// mode they were issued with.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Folds a streamed token into the open assistant message.
    ///
    /// The backend occasionally resends content it already streamed, either
    /// as a trailing repeat or as a cumulative prefix of everything so far.
    /// Both shapes are suppressed:
    /// - open text already ends with the trimmed token: discard;
    /// - trimmed token starts with the entire open text: replace;
    /// - otherwise append, space-separated once the text is non-empty.
    fn fold_token(&mut self, token: &str) {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return;
        }

        let phase = &mut self.phase;
        let Some(open) = self
            .messages
            .last_mut()
            .filter(|m| m.sender == Sender::Assistant)
        else {
            return;
        };

        if open.text.is_empty() {
            open.text.push_str(trimmed);
        } else if open.text.ends_with(trimmed) {
            return;
        } else if trimmed.starts_with(open.text.as_str()) {
            open.text.clear();
            open.text.push_str(trimmed);
        } else {
            open.text.push(' ');
            open.text.push_str(trimmed);
        }
        *phase = StreamPhase::Accumulating;
    }

    fn open_message(&mut self) -> Option<&mut Message> {
        if !self.pending {
            return None;
        }
        self.messages
            .last_mut()
            .filter(|m| m.sender == Sender::Assistant)
    }

    fn close_turn(&mut self) {
        self.pending = false;
        self.phase = StreamPhase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(text: &str) -> ChatEvent {
        ChatEvent::Delta {
            text: text.to_string(),
        }
    }

    fn completed(thread_id: &str) -> ChatEvent {
        ChatEvent::Completed {
            thread_id: Some(thread_id.to_string()),
        }
    }

    fn last_text(conversation: &Conversation) -> &str {
        &conversation.messages().last().unwrap().text
    }

    #[test]
    fn test_begin_turn_appends_user_and_open_assistant() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("¿Qué propone el PSOE en vivienda?");
        assert_eq!(generation, Some(1));

        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "¿Qué propone el PSOE en vivienda?");
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].text, "");
        assert!(conversation.is_pending());
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let mut conversation = Conversation::default();
        assert_eq!(conversation.begin_turn("   "), None);
        assert_eq!(conversation.begin_turn(""), None);
        assert!(conversation.messages().is_empty());
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_second_send_while_pending_is_noop() {
        let mut conversation = Conversation::default();
        assert!(conversation.begin_turn("primera").is_some());
        assert_eq!(conversation.begin_turn("segunda"), None);
        assert_eq!(conversation.messages().len(), 2);
    }

    #[test]
    fn test_cumulative_resend_replaces_open_text() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("hola").unwrap();

        conversation.apply(generation, delta("Hola"));
        conversation.apply(generation, delta("Hola mundo"));
        conversation.apply(generation, completed("t1"));

        assert_eq!(last_text(&conversation), "Hola mundo");
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_trailing_repeat_is_discarded() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("hola").unwrap();

        conversation.apply(generation, delta("El programa"));
        conversation.apply(generation, delta("propone"));
        conversation.apply(generation, delta("propone"));

        assert_eq!(last_text(&conversation), "El programa propone");
    }

    #[test]
    fn test_tokens_join_with_single_space() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("hola").unwrap();

        conversation.apply(generation, delta("  Según  "));
        conversation.apply(generation, delta("el programa"));

        assert_eq!(last_text(&conversation), "Según el programa");
    }

    #[test]
    fn test_reset_clears_everything_and_ignores_late_events() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("hola").unwrap();
        conversation.apply(generation, delta("Respuesta"));

        conversation.reset();
        assert!(conversation.messages().is_empty());
        assert_eq!(conversation.thread_id(), None);
        assert!(!conversation.is_pending());

        // Late chunk from the cancelled stream.
        conversation.apply(generation, delta("tarde"));
        conversation.apply(generation, completed("t9"));
        assert!(conversation.messages().is_empty());
        assert_eq!(conversation.thread_id(), None);
    }

    #[test]
    fn test_thread_id_set_once_first_wins() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("uno").unwrap();
        conversation.apply(generation, delta("a"));
        conversation.apply(generation, completed("t1"));
        assert_eq!(conversation.thread_id(), Some("t1"));

        let generation = conversation.begin_turn("dos").unwrap();
        conversation.apply(generation, delta("b"));
        conversation.apply(generation, completed("t2"));
        assert_eq!(conversation.thread_id(), Some("t1"));
    }

    #[test]
    fn test_empty_thread_id_does_not_claim_slot() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("uno").unwrap();
        conversation.apply(
            generation,
            ChatEvent::Completed {
                thread_id: Some(String::new()),
            },
        );
        assert_eq!(conversation.thread_id(), None);

        let generation = conversation.begin_turn("dos").unwrap();
        conversation.apply(generation, completed("t1"));
        assert_eq!(conversation.thread_id(), Some("t1"));
    }

    #[test]
    fn test_failure_substitutes_transport_apology() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("hola").unwrap();
        conversation.apply(generation, delta("parcial"));
        conversation.apply(
            generation,
            ChatEvent::Failed {
                message: "connection refused".to_string(),
            },
        );

        assert_eq!(last_text(&conversation), APOLOGY_TRANSPORT);
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_empty_completion_substitutes_bad_response_apology() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("hola").unwrap();
        conversation.apply(generation, completed("t1"));

        assert_eq!(last_text(&conversation), APOLOGY_BAD_RESPONSE);
        assert!(!conversation.is_pending());
    }

    #[test]
    fn test_events_after_close_are_dropped() {
        let mut conversation = Conversation::default();
        let generation = conversation.begin_turn("hola").unwrap();
        conversation.apply(generation, delta("listo"));
        conversation.apply(generation, completed("t1"));

        conversation.apply(generation, delta("extra"));
        assert_eq!(last_text(&conversation), "listo");
    }

    #[test]
    fn test_each_turn_opens_fresh_assistant_message() {
        let mut conversation = Conversation::default();
        let first = conversation.begin_turn("uno").unwrap();
        conversation.apply(first, delta("respuesta uno"));
        conversation.apply(first, completed("t1"));

        let second = conversation.begin_turn("dos").unwrap();
        conversation.apply(second, delta("respuesta dos"));
        conversation.apply(second, ChatEvent::Completed { thread_id: None });

        let messages = conversation.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].text, "respuesta uno");
        assert_eq!(messages[3].text, "respuesta dos");
    }

    #[test]
    fn test_set_mode_does_not_disturb_open_turn() {
        let mut conversation = Conversation::new(Mode::Neutral);
        let generation = conversation.begin_turn("hola").unwrap();
        conversation.set_mode(Mode::Personal);
        conversation.apply(generation, delta("texto"));

        assert_eq!(conversation.mode(), Mode::Personal);
        assert!(conversation.is_pending());
        assert_eq!(last_text(&conversation), "texto");
    }
}
