//! # Storage Module - Journal Persistence Layer
//!
//! The journal core never talks to a database directly. Everything it needs from
//! persistence goes through the [`JournalStore`] trait, which the bot receives as an
//! injected `Arc<dyn JournalStore>`. That keeps the dialogue logic independent of the
//! backing engine and lets tests swap in doubles (including failing ones).
//!
//! ## Backends
//!
//! - [`SledJournalStore`] - embedded sled database, one bincode record per entry
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dmjournal::storage::{JournalStore, SledJournalStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SledJournalStore::open("./data/journal")?;
//!     let entry = store.insert_entry("alice", "Slept well", "sleep").await?;
//!     let all = store.get_entries("alice").await?;
//!     assert!(all.iter().any(|e| e.id == entry.id));
//!     Ok(())
//! }
//! ```
//!
//! ## Consistency
//!
//! Backends make no transactional promises beyond "the call succeeds or returns an
//! error". Every mutation is scoped by `(username, id)`; an id belonging to another
//! user behaves exactly like an id that does not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod sled_store;

pub use sled_store::{JournalStatistics, SledJournalStore};

/// A single journal entry as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub username: String,
    pub text: String,
    pub tags: String,
    pub created_at: DateTime<Utc>,
}

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record did not decode into the user it was filed under.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Persistence collaborator for journal entries.
///
/// Implementations must tolerate concurrent independent calls; the journal core
/// imposes no locking of its own.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// All entries owned by `username`, ascending by id.
    async fn get_entries(&self, username: &str) -> Result<Vec<JournalEntry>, StoreError>;

    /// Persist a new entry and return it with its assigned id and timestamp.
    async fn insert_entry(
        &self,
        username: &str,
        text: &str,
        tags: &str,
    ) -> Result<JournalEntry, StoreError>;

    /// Replace the text of one entry. Returns `false` when `username` owns no entry with `id`.
    async fn update_entry(&self, username: &str, id: u64, new_text: &str)
        -> Result<bool, StoreError>;

    /// Remove one entry. Returns `false` when `username` owns no entry with `id`.
    async fn delete_entry(&self, username: &str, id: u64) -> Result<bool, StoreError>;
}
