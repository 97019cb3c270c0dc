//! # dmjournal - Personal Journal Bot for Direct Messages
//!
//! dmjournal lets chat users keep a private journal by talking to a bot. Entries are
//! written with a single command and browsed, edited and deleted through a short
//! dialogue in direct messages.
//!
//! ## Features
//!
//! - **One-shot writing**: `!write Slept well |tags: sleep,mood` stores an entry with tags
//! - **DM browsing**: `!journal` lists entries with previews, then view/edit/delete by id
//! - **Message limits**: long listings and entries are split into 2000-character messages
//! - **Reply timeouts**: each dialogue step waits 60 seconds (configurable) before closing
//! - **Pluggable edges**: storage and chat delivery are traits injected into the bot
//! - **Embedded storage**: sled-backed store, no external database to run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dmjournal::bot::JournalBot;
//! use dmjournal::config::Config;
//! use dmjournal::storage::SledJournalStore;
//! use dmjournal::transport::{console, ChannelSink};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = Arc::new(SledJournalStore::open(config.storage.journal_db_path())?);
//!     let (sink, outgoing) = ChannelSink::pair();
//!     let (events_tx, events_rx) = mpsc::unbounded_channel();
//!     console::spawn_writer(outgoing);
//!     console::spawn_reader(config.console.default_user.clone(), events_tx);
//!     JournalBot::new(config, store, Arc::new(sink)).run(events_rx).await
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - event routing, command parsing, session table
//! - [`journal`] - chunked sending, entry browser state machine, entry writer
//! - [`storage`] - `JournalStore` trait and the sled backend
//! - [`transport`] - platform boundary types and the console adapter
//! - [`config`] - configuration loading and validation
//! - [`logutil`] - log-safe rendering of user text
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Transport     │ ← TextEvent in, OutgoingMessage out
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   JournalBot    │ ← commands + per-user session tasks
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Journal core    │ ← browser state machine, writer, chunker
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Storage       │ ← JournalStore (sled)
//! └─────────────────┘
//! ```

pub mod bot;
pub mod config;
pub mod journal;
pub mod logutil;
pub mod storage;
pub mod transport;
