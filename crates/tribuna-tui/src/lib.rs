//! Full-screen TUI for tribuna.

pub mod effects;
pub mod events;
pub mod input;
pub mod markdown;
pub mod notice;
pub mod render;
pub mod runtime;
pub mod state;
pub mod suggestions;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use runtime::TuiRuntime;
use tribuna_core::client::BackendClient;
use tribuna_core::config::{Config, paths};

use crate::notice::FsNoticeStore;

/// Runs the interactive chat loop.
pub async fn run_interactive_chat(config: &Config) -> Result<()> {
    // Chat mode requires a terminal to render the TUI
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Chat mode requires a terminal.\n\
             Use `tribuna ask --prompt '...'` for non-interactive queries."
        );
    }

    let client = BackendClient::from_config(config)?;
    let notice_store = FsNoticeStore::new(paths::notice_ack_path());

    let mut runtime = TuiRuntime::new(client, config, Box::new(notice_store))?;
    runtime.run()?;

    Ok(())
}
