//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the Elm runtime boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! Request tasks send [`ChatEvent`]s over a per-request channel stored in
//! `StreamState`; anything else async arrives through the inbox channel.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tribuna_core::client::{BackendClient, StreamEvent};
use tribuna_core::config::{Config, Delivery};
use tribuna_core::conversation::Mode;
use tribuna_core::events::ChatEvent;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::notice::NoticeStore;
use crate::state::{AppState, StreamState};
use crate::{render, terminal, update};

/// Target frame interval while streaming (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll interval when nothing is happening.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop, panic
/// and Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    client: BackendClient,
    notice_store: Box<dyn NoticeStore>,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime.
    pub fn new(
        client: BackendClient,
        config: &Config,
        notice_store: Box<dyn NoticeStore>,
    ) -> Result<Self> {
        // Panic hook goes in BEFORE entering the alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let state = AppState::new(
            config.mode,
            config.delivery,
            notice_store.is_acknowledged(),
        );
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            client,
            notice_store,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop, restoring the terminal afterwards.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        let _ = terminal::restore_terminal();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let events = self.collect_events()?;

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Collects events from the request channel, the inbox and the terminal.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Fast polling while streaming or right after keyboard activity.
        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.tui.stream.is_active()
            || self.state.tui.conversation.is_pending()
            || recent_terminal_activity
        {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        self.collect_chat_events(&mut events);
        while let Ok(inbox_event) = self.inbox_rx.try_recv() {
            events.push(inbox_event);
        }

        // Block until the next tick is due unless there is already work.
        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    /// Drains the in-flight request channel, tagging events with its
    /// generation.
    fn collect_chat_events(&mut self, events: &mut Vec<UiEvent>) {
        let StreamState::Active { rx, generation, .. } = &mut self.state.tui.stream else {
            return;
        };
        let generation = *generation;

        loop {
            match rx.try_recv() {
                Ok(chat_event) => events.push(UiEvent::Chat {
                    generation,
                    event: chat_event,
                }),
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::CancelStream { cancel } => {
                cancel.cancel();
            }
            UiEffect::AcknowledgeNotice => {
                if let Err(err) = self.notice_store.acknowledge() {
                    tracing::warn!(error = %err, "failed to persist notice acknowledgement");
                }
            }
            UiEffect::SendQuery {
                query,
                mode,
                thread_id,
                generation,
                delivery,
            } => self.spawn_query(query, mode, thread_id, generation, delivery),
        }
    }

    /// Spawns the request task and hands its channel to the reducer.
    fn spawn_query(
        &mut self,
        query: String,
        mode: Mode,
        thread_id: Option<String>,
        generation: u64,
        delivery: Delivery,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let _ = self.inbox_tx.send(UiEvent::StreamStarted {
            generation,
            rx,
            cancel: cancel.clone(),
        });

        let client = self.client.clone();
        tokio::spawn(async move {
            drive_query(&client, &query, mode, thread_id.as_deref(), delivery, &tx, cancel).await;
        });
    }
}

/// Drives one backend request, forwarding events until completion.
///
/// Exactly one closing event (`Completed` or `Failed`) is sent per call.
pub async fn drive_query(
    client: &BackendClient,
    query: &str,
    mode: Mode,
    thread_id: Option<&str>,
    delivery: Delivery,
    tx: &mpsc::UnboundedSender<ChatEvent>,
    cancel: CancellationToken,
) {
    match delivery {
        Delivery::Batch => drive_batch(client, query, mode, thread_id, tx).await,
        Delivery::Stream => drive_stream(client, query, mode, thread_id, tx, cancel).await,
    }
}

async fn drive_batch(
    client: &BackendClient,
    query: &str,
    mode: Mode,
    thread_id: Option<&str>,
    tx: &mpsc::UnboundedSender<ChatEvent>,
) {
    match client.search(query, mode, thread_id).await {
        Ok(response) => {
            // A missing response body leaves the turn empty; the reducer
            // substitutes the apology on completion.
            if let Some(text) = response.response.filter(|text| !text.trim().is_empty()) {
                let _ = tx.send(ChatEvent::Delta { text });
            }
            let _ = tx.send(ChatEvent::Completed {
                thread_id: response.thread_id,
            });
        }
        Err(err) => {
            let _ = tx.send(ChatEvent::Failed {
                message: err.to_string(),
            });
        }
    }
}

async fn drive_stream(
    client: &BackendClient,
    query: &str,
    mode: Mode,
    thread_id: Option<&str>,
    tx: &mpsc::UnboundedSender<ChatEvent>,
    cancel: CancellationToken,
) {
    let mut events = match client.search_stream(query, mode, thread_id).await {
        Ok(events) => events,
        Err(err) => {
            let _ = tx.send(ChatEvent::Failed {
                message: err.to_string(),
            });
            return;
        }
    };

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            next = events.next() => match next {
                Some(Ok(StreamEvent::Token { content })) => {
                    let _ = tx.send(ChatEvent::Delta { text: content });
                }
                Some(Ok(StreamEvent::Done { thread_id })) => {
                    let _ = tx.send(ChatEvent::Completed { thread_id });
                    break;
                }
                Some(Err(err)) => {
                    let _ = tx.send(ChatEvent::Failed {
                        message: err.to_string(),
                    });
                    break;
                }
                // Stream ended without a done event.
                None => {
                    let _ = tx.send(ChatEvent::Completed { thread_id: None });
                    break;
                }
            },
        }
    }
}
