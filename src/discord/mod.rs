//! Chat surface: mention-prefixed text commands, slash commands and the
//! rendering of their results.

mod bot;
mod commands;
pub mod format;
mod handler;

pub use bot::{Data, create_framework, intents};
