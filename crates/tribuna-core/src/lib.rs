//! Core tribuna library (config, backend client, conversation state).

pub mod client;
pub mod config;
pub mod conversation;
pub mod events;
pub mod logging;
