use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use sled::IVec;

use super::{JournalEntry, JournalStore, StoreError};

const TREE_ENTRIES: &str = "journal_entries";
const ENTRY_PREFIX: &str = "entries:";

/// Aggregate counts shown by `dmjournal status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JournalStatistics {
    pub total_entries: usize,
    pub total_users: usize,
}

/// Sled-backed journal storage.
///
/// Keys are `entries:<encoded user>:<id:020>`, so a prefix scan yields one user's
/// entries already ordered by id. The username segment is percent-encoded, which keeps
/// `:` and other separators out of the key layout.
pub struct SledJournalStore {
    db: sled::Db,
    entries: sled::Tree,
}

impl SledJournalStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        Self::from_db(db)
    }

    /// In-memory store that is discarded on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let entries = db.open_tree(TREE_ENTRIES)?;
        Ok(Self { db, entries })
    }

    fn user_prefix(username: &str) -> String {
        format!(
            "{}{}:",
            ENTRY_PREFIX,
            utf8_percent_encode(username, NON_ALPHANUMERIC)
        )
    }

    fn entry_key(username: &str, id: u64) -> Vec<u8> {
        format!("{}{:020}", Self::user_prefix(username), id).into_bytes()
    }

    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize(bytes: IVec) -> Result<JournalEntry, StoreError> {
        Ok(bincode::deserialize::<JournalEntry>(&bytes)?)
    }

    /// Count stored entries and the distinct users owning them.
    pub fn statistics(&self) -> Result<JournalStatistics, StoreError> {
        let mut users = HashSet::new();
        let mut total_entries = 0usize;
        for item in self.entries.scan_prefix(ENTRY_PREFIX.as_bytes()) {
            let (key, _) = item?;
            let text = String::from_utf8_lossy(&key);
            let owner = text
                .strip_prefix(ENTRY_PREFIX)
                .and_then(|rest| rest.rsplit_once(':'))
                .map(|(user, _)| user.to_string())
                .ok_or_else(|| StoreError::Corrupt(text.to_string()))?;
            users.insert(owner);
            total_entries += 1;
        }
        Ok(JournalStatistics {
            total_entries,
            total_users: users.len(),
        })
    }
}

#[async_trait]
impl JournalStore for SledJournalStore {
    async fn get_entries(&self, username: &str) -> Result<Vec<JournalEntry>, StoreError> {
        let prefix = Self::user_prefix(username);
        let mut out = Vec::new();
        for item in self.entries.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            let entry = Self::deserialize(value)?;
            if entry.username != username {
                return Err(StoreError::Corrupt(format!(
                    "entry {} filed under {} belongs to {}",
                    entry.id, username, entry.username
                )));
            }
            out.push(entry);
        }
        Ok(out)
    }

    async fn insert_entry(
        &self,
        username: &str,
        text: &str,
        tags: &str,
    ) -> Result<JournalEntry, StoreError> {
        // sled ids start at zero; journal ids start at one
        let id = self.db.generate_id()? + 1;
        let entry = JournalEntry {
            id,
            username: username.to_string(),
            text: text.to_string(),
            tags: tags.to_string(),
            created_at: Utc::now(),
        };
        self.entries
            .insert(Self::entry_key(username, id), Self::serialize(&entry)?)?;
        self.entries.flush()?;
        debug!("stored journal entry {} for {}", id, username);
        Ok(entry)
    }

    async fn update_entry(
        &self,
        username: &str,
        id: u64,
        new_text: &str,
    ) -> Result<bool, StoreError> {
        let key = Self::entry_key(username, id);
        let Some(bytes) = self.entries.get(&key)? else {
            return Ok(false);
        };
        let mut entry = Self::deserialize(bytes)?;
        entry.text = new_text.to_string();
        self.entries.insert(key, Self::serialize(&entry)?)?;
        self.entries.flush()?;
        Ok(true)
    }

    async fn delete_entry(&self, username: &str, id: u64) -> Result<bool, StoreError> {
        let removed = self.entries.remove(Self::entry_key(username, id))?;
        self.entries.flush()?;
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn entries_are_scoped_per_user_and_ordered() {
        let store = SledJournalStore::temporary().expect("store");
        let a1 = store.insert_entry("alice", "first", "general").await.unwrap();
        store.insert_entry("bob", "not yours", "general").await.unwrap();
        let a2 = store.insert_entry("alice", "second", "mood").await.unwrap();

        let alice = store.get_entries("alice").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].id, a1.id);
        assert_eq!(alice[1].id, a2.id);
        assert!(a1.id >= 1);
        assert_eq!(alice[1].tags, "mood");
        assert!(store.get_entries("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn usernames_with_separators_do_not_collide() {
        let store = SledJournalStore::temporary().expect("store");
        store.insert_entry("al", "short", "general").await.unwrap();
        store.insert_entry("al:ice", "tricky", "general").await.unwrap();
        let al = store.get_entries("al").await.unwrap();
        assert_eq!(al.len(), 1);
        assert_eq!(al[0].text, "short");
    }

    #[tokio::test]
    async fn mutations_require_the_owner() {
        let store = SledJournalStore::temporary().expect("store");
        let entry = store.insert_entry("alice", "secret", "general").await.unwrap();

        assert!(!store.update_entry("bob", entry.id, "hijack").await.unwrap());
        assert!(!store.delete_entry("bob", entry.id).await.unwrap());
        assert_eq!(store.get_entries("alice").await.unwrap()[0].text, "secret");

        assert!(store.update_entry("alice", entry.id, "revised").await.unwrap());
        assert_eq!(store.get_entries("alice").await.unwrap()[0].text, "revised");
        assert!(store.delete_entry("alice", entry.id).await.unwrap());
        assert!(store.get_entries("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let id = {
            let store = SledJournalStore::open(dir.path()).expect("store");
            store.insert_entry("alice", "persisted", "general").await.unwrap().id
        };
        let store = SledJournalStore::open(dir.path()).expect("reopen");
        let entries = store.get_entries("alice").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        let stats = store.statistics().unwrap();
        assert_eq!(stats, JournalStatistics { total_entries: 1, total_users: 1 });
    }
}
