//! # Bot Module
//!
//! Ties the journal core to a chat transport.
//!
//! - [`server`] - [`JournalBot`], the event router and session table
//! - [`commands`] - prefix command parsing (`journal`, `write`, `help`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dmjournal::bot::JournalBot;
//! use dmjournal::config::Config;
//! use dmjournal::storage::SledJournalStore;
//! use dmjournal::transport::{ChannelSink, TextEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let store = Arc::new(SledJournalStore::open(config.storage.journal_db_path())?);
//!     let (sink, _outgoing) = ChannelSink::pair();
//!     let mut bot = JournalBot::new(config, store, Arc::new(sink));
//!     bot.route_text_event(TextEvent::in_channel("alice", "general", "!write Slept well"))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Session Lifecycle
//!
//! 1. `journal` opens a session for the author; a second `journal` replaces the first
//! 2. Plain text from that author is queued to the session, wherever it was typed
//! 3. The session answers in the author's DM until exit, timeout or replacement

pub mod commands;
pub mod server;

pub use commands::{CommandParser, JournalCommand};
pub use server::JournalBot;
