//! Pure reducer: folds `UiEvent`s into state and returns effects.
//!
//! All state mutation lives here. The runtime executes the returned
//! effects; nothing in this module performs I/O.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tribuna_core::events::ChatEvent;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, Overlay, StreamState};

pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if state.tui.conversation.is_pending() {
                state.tui.spinner_frame = state.tui.spinner_frame.wrapping_add(1);
            }
            Vec::new()
        }
        UiEvent::Terminal(terminal_event) => handle_terminal(state, &terminal_event),
        UiEvent::StreamStarted {
            generation,
            rx,
            cancel,
        } => {
            state.tui.stream = StreamState::Active {
                rx,
                generation,
                cancel,
            };
            Vec::new()
        }
        UiEvent::Chat { generation, event } => {
            let closes = matches!(
                event,
                ChatEvent::Completed { .. } | ChatEvent::Failed { .. }
            );
            state.tui.conversation.apply(generation, event);
            if closes
                && let StreamState::Active {
                    generation: active, ..
                } = &state.tui.stream
                && *active == generation
            {
                state.tui.stream = StreamState::Idle;
            }
            Vec::new()
        }
    }
}

fn handle_terminal(state: &mut AppState, event: &Event) -> Vec<UiEffect> {
    let Event::Key(key) = event else {
        return Vec::new();
    };
    if key.kind != KeyEventKind::Press {
        return Vec::new();
    }

    if state.overlay == Some(Overlay::LegalNotice) {
        return handle_notice_key(state, key);
    }
    handle_chat_key(state, key)
}

/// The legal notice swallows all input until accepted.
fn handle_notice_key(state: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter => {
            state.overlay = None;
            vec![UiEffect::AcknowledgeNotice]
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.tui.should_quit = true;
            vec![UiEffect::Quit]
        }
        _ => Vec::new(),
    }
}

fn handle_chat_key(state: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    let tui = &mut state.tui;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                tui.should_quit = true;
                return vec![UiEffect::Quit];
            }
            KeyCode::Char('n') => return reset_conversation(state),
            _ => return Vec::new(),
        }
    }

    match key.code {
        KeyCode::Esc => {
            tui.should_quit = true;
            vec![UiEffect::Quit]
        }
        KeyCode::Enter => submit(state),
        KeyCode::Tab => {
            let mode = tui.conversation.mode().toggled();
            tui.conversation.set_mode(mode);
            Vec::new()
        }
        KeyCode::Up if tui.conversation.messages().is_empty() => {
            tui.suggestions.select_previous();
            Vec::new()
        }
        KeyCode::Down if tui.conversation.messages().is_empty() => {
            tui.suggestions.select_next();
            Vec::new()
        }
        KeyCode::Left => {
            tui.input.move_left();
            Vec::new()
        }
        KeyCode::Right => {
            tui.input.move_right();
            Vec::new()
        }
        KeyCode::Home => {
            tui.input.move_home();
            Vec::new()
        }
        KeyCode::End => {
            tui.input.move_end();
            Vec::new()
        }
        KeyCode::Backspace => {
            tui.input.backspace();
            Vec::new()
        }
        KeyCode::Delete => {
            tui.input.delete();
            Vec::new()
        }
        KeyCode::Char(c) => {
            tui.input.insert(c);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Enter: fills the input from the selected suggestion when the box is
/// empty, otherwise opens a turn and asks the runtime to send it.
fn submit(state: &mut AppState) -> Vec<UiEffect> {
    let tui = &mut state.tui;

    if tui.input.is_empty() {
        if let Some(question) = tui.suggestions.selected_question() {
            tui.input.set_text(question);
            tui.suggestions.clear();
        }
        return Vec::new();
    }

    let text = tui.input.text().to_string();
    let Some(generation) = tui.conversation.begin_turn(&text) else {
        return Vec::new();
    };

    tui.input.take();
    tui.suggestions.clear();
    tui.spinner_frame = 0;

    vec![UiEffect::SendQuery {
        query: text.trim().to_string(),
        mode: tui.conversation.mode(),
        thread_id: tui.conversation.thread_id().map(str::to_string),
        generation,
        delivery: tui.delivery,
    }]
}

/// Ctrl+N: drop the thread and start over. An in-flight request is
/// cancelled; its late events carry a stale generation anyway.
fn reset_conversation(state: &mut AppState) -> Vec<UiEffect> {
    let tui = &mut state.tui;
    let mut effects = Vec::new();

    if let StreamState::Active { cancel, .. } = &tui.stream {
        effects.push(UiEffect::CancelStream {
            cancel: cancel.clone(),
        });
    }
    tui.stream = StreamState::Idle;
    tui.conversation.reset();
    tui.suggestions.clear();
    tui.spinner_frame = 0;
    effects
}
