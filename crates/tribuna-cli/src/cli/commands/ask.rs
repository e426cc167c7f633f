//! `ask` subcommand: one-shot query printed to stdout.
//!
//! Tokens are printed as they arrive. Backend failures print the apology
//! text and exit zero; only usage errors are fatal.

use std::io::Write;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tribuna_core::client::BackendClient;
use tribuna_core::config::{Config, Delivery};
use tribuna_core::conversation::{Conversation, Mode};
use tribuna_core::events::ChatEvent;
use tribuna_tui::runtime::drive_query;

pub async fn run(
    config: &Config,
    prompt: &str,
    mode: Mode,
    delivery: Delivery,
    thread_id: Option<&str>,
) -> Result<()> {
    let client = BackendClient::from_config(config)?;

    let mut conversation = Conversation::new(mode);
    let Some(generation) = conversation.begin_turn(prompt) else {
        anyhow::bail!("The prompt must not be empty");
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let driver = drive_query(
        &client,
        prompt.trim(),
        mode,
        thread_id,
        delivery,
        &tx,
        CancellationToken::new(),
    );

    // Fold events through the conversation and print whatever the open
    // message gained. Duplicate suppression makes each update an extension
    // of the previous text, so printing the suffix is enough; a failure
    // replaces the text wholesale and is printed on its own line.
    let printer = async {
        let mut stdout = std::io::stdout();
        let mut printed = String::new();
        while let Some(event) = rx.recv().await {
            let closing = matches!(
                event,
                ChatEvent::Completed { .. } | ChatEvent::Failed { .. }
            );
            conversation.apply(generation, event);

            let text = conversation
                .messages()
                .last()
                .map_or("", |message| message.text.as_str());
            if let Some(suffix) = text.strip_prefix(printed.as_str()) {
                if !suffix.is_empty() {
                    write!(stdout, "{suffix}")?;
                    stdout.flush()?;
                    printed.push_str(suffix);
                }
            } else {
                if !printed.is_empty() {
                    writeln!(stdout)?;
                }
                write!(stdout, "{text}")?;
                stdout.flush()?;
                printed = text.to_string();
            }

            if closing {
                break;
            }
        }
        writeln!(stdout)?;
        Ok::<(), std::io::Error>(())
    };

    let ((), print_result) = tokio::join!(driver, printer);
    print_result?;

    if let Some(thread) = conversation.thread_id() {
        tracing::info!(thread_id = thread, "turn completed");
    }
    Ok(())
}
