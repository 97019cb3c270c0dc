use anyhow::Result;
use log::{debug, info};

use crate::logutil::escape_log;
use crate::storage::{JournalEntry, JournalStore};

pub const NO_ENTRIES: &str =
    "📓 You don't have any journal entries yet. Use the `write` command to start your journal!";
pub const LIST_HEADER: &str = "📚 Your Journal Entries:";
pub const SELECT_PROMPT: &str = "👉 Type the ID of an entry to view, or `exit` to close the journal.";
pub const ACTION_PROMPT: &str = "✏️ To edit, type `edit`. To delete, type `delete`. Type `list` to return to the list or `exit` to close the journal.";
pub const INVALID_ID: &str = "❌ Invalid ID. Please enter a valid entry ID or `exit`.";
pub const CLOSING: &str = "📕 Closing your journal. See you next time!";
pub const INACTIVITY: &str = "⏰ Oops! The journal closed due to inactivity.";
pub const EDIT_PROMPT: &str = "Please enter the new content for this entry.";
pub const EDIT_TIMED_OUT: &str = "Edit timed out.";
pub const ENTRY_UPDATED: &str = "Entry updated.";

/// Replies accepted while an entry is open.
pub const ACTIONS: [&str; 4] = ["edit", "delete", "list", "exit"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// # Entry Browser States
///
/// ```text
/// Listing ──(empty)──────────────────────────────► Closed(NoEntries)
///    │
///    ▼
/// AwaitSelection ──exit / timeout──────────────────► Closed
///    │ ▲ unknown id
///    │ └──────┘
///    ▼ known id
/// AwaitAction ──edit──► AwaitEditText ──text / timeout──► AwaitSelection
///    ├──delete (refresh)──────────────────────────────► AwaitSelection
///    ├──list────────────────────────────────────────► Listing
///    └──exit / timeout──────────────────────────────► Closed
/// ```
///
/// Each waiting state declares which replies it accepts through [`BrowserState::accepts`];
/// anything else is ignored without restarting the reply clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserState {
    Listing,
    AwaitSelection,
    AwaitAction { entry_id: u64 },
    AwaitEditText { entry_id: u64 },
    Closed(CloseReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The user had nothing to browse.
    NoEntries,
    /// The user typed `exit`.
    Exit,
    /// No accepted reply arrived in time.
    Timeout,
    /// The reply queue closed underneath the session (superseded or shutdown).
    Dropped,
}

/// Outcome of feeding one reply to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The reply does not satisfy the current state's predicate; keep waiting.
    Ignored,
    /// The reply was consumed; send these messages and start a fresh wait.
    Advanced(Vec<String>),
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

impl BrowserState {
    /// Whether `text` qualifies as a reply in this state.
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            BrowserState::AwaitSelection => is_digits(text) || text.eq_ignore_ascii_case("exit"),
            BrowserState::AwaitAction { .. } => {
                ACTIONS.iter().any(|a| text.eq_ignore_ascii_case(a))
            }
            BrowserState::AwaitEditText { .. } => true,
            BrowserState::Listing | BrowserState::Closed(_) => false,
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            BrowserState::AwaitSelection
                | BrowserState::AwaitAction { .. }
                | BrowserState::AwaitEditText { .. }
        )
    }
}

/// Dialogue for listing, viewing, editing and deleting one user's entries.
///
/// The browser performs no I/O beyond store calls: it returns the messages to send and
/// leaves delivery and reply waiting to the caller (see [`super::runner`]). The entry
/// list is cached for the whole browsing loop and only re-fetched on `list` and after a
/// delete.
#[derive(Debug)]
pub struct EntryBrowser {
    username: String,
    preview_chars: usize,
    entries: Vec<JournalEntry>,
    state: BrowserState,
}

impl EntryBrowser {
    pub fn new(username: impl Into<String>, preview_chars: usize) -> Self {
        Self {
            username: username.into(),
            preview_chars,
            entries: Vec::new(),
            state: BrowserState::Listing,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    /// Entries cached for the current browsing loop.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, BrowserState::Closed(_))
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        match self.state {
            BrowserState::Closed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn close(&mut self, reason: CloseReason) {
        debug!("browser {} closed: {:?}", escape_log(&self.username), reason);
        self.state = BrowserState::Closed(reason);
    }

    /// Open the journal: fetch and render the entry list.
    pub async fn start(&mut self, store: &dyn JournalStore) -> Result<Vec<String>> {
        self.list(store).await
    }

    async fn list(&mut self, store: &dyn JournalStore) -> Result<Vec<String>> {
        self.entries = store.get_entries(&self.username).await?;
        if self.entries.is_empty() {
            self.close(CloseReason::NoEntries);
            return Ok(vec![NO_ENTRIES.to_string()]);
        }
        self.state = BrowserState::AwaitSelection;
        Ok(vec![self.render_listing(), SELECT_PROMPT.to_string()])
    }

    fn render_listing(&self) -> String {
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|entry| {
                let preview: String = entry.text.chars().take(self.preview_chars).collect();
                format!(
                    "🔖 ID: {} | {}\n📝 Preview: {}...",
                    entry.id,
                    entry.created_at.format(TIMESTAMP_FORMAT),
                    preview
                )
            })
            .collect();
        format!("{}\n{}", LIST_HEADER, lines.join("\n"))
    }

    /// Feed one reply from the session owner.
    pub async fn handle_reply(&mut self, text: &str, store: &dyn JournalStore) -> Result<Step> {
        if !self.state.accepts(text) {
            return Ok(Step::Ignored);
        }
        let out = match self.state.clone() {
            BrowserState::AwaitSelection => self.on_selection(text),
            BrowserState::AwaitAction { entry_id } => self.on_action(entry_id, text, store).await?,
            BrowserState::AwaitEditText { entry_id } => {
                self.on_edit_text(entry_id, text, store).await?
            }
            BrowserState::Listing | BrowserState::Closed(_) => return Ok(Step::Ignored),
        };
        Ok(Step::Advanced(out))
    }

    /// The current wait expired without an accepted reply.
    pub fn handle_timeout(&mut self) -> Vec<String> {
        match self.state {
            BrowserState::AwaitSelection | BrowserState::AwaitAction { .. } => {
                self.close(CloseReason::Timeout);
                vec![INACTIVITY.to_string()]
            }
            BrowserState::AwaitEditText { entry_id } => {
                debug!("edit of entry {} timed out", entry_id);
                self.state = BrowserState::AwaitSelection;
                vec![EDIT_TIMED_OUT.to_string()]
            }
            BrowserState::Listing | BrowserState::Closed(_) => Vec::new(),
        }
    }

    fn on_selection(&mut self, text: &str) -> Vec<String> {
        if text.eq_ignore_ascii_case("exit") {
            self.close(CloseReason::Exit);
            return vec![CLOSING.to_string()];
        }
        let selected = text
            .parse::<u64>()
            .ok()
            .and_then(|id| self.entries.iter().find(|e| e.id == id))
            .map(|entry| (entry.id, format!("📖 Entry ID: {}\n{}", entry.id, entry.text)));
        match selected {
            Some((entry_id, view)) => {
                self.state = BrowserState::AwaitAction { entry_id };
                vec![view, ACTION_PROMPT.to_string()]
            }
            None => vec![INVALID_ID.to_string()],
        }
    }

    async fn on_action(
        &mut self,
        entry_id: u64,
        text: &str,
        store: &dyn JournalStore,
    ) -> Result<Vec<String>> {
        let action = text.to_ascii_lowercase();
        match action.as_str() {
            "edit" => {
                self.state = BrowserState::AwaitEditText { entry_id };
                Ok(vec![EDIT_PROMPT.to_string()])
            }
            "delete" => {
                let removed = store.delete_entry(&self.username, entry_id).await?;
                info!(
                    "journal.delete user={} id={} removed={}",
                    escape_log(&self.username),
                    entry_id,
                    removed
                );
                self.entries = store.get_entries(&self.username).await?;
                self.state = BrowserState::AwaitSelection;
                Ok(vec![if removed {
                    format!("Deleted entry with ID {}.", entry_id)
                } else {
                    format!("Entry with ID {} no longer exists.", entry_id)
                }])
            }
            "list" => self.list(store).await,
            _ => {
                self.close(CloseReason::Exit);
                Ok(vec![CLOSING.to_string()])
            }
        }
    }

    async fn on_edit_text(
        &mut self,
        entry_id: u64,
        text: &str,
        store: &dyn JournalStore,
    ) -> Result<Vec<String>> {
        let updated = store.update_entry(&self.username, entry_id, text).await?;
        info!(
            "journal.edit user={} id={} updated={}",
            escape_log(&self.username),
            entry_id,
            updated
        );
        self.state = BrowserState::AwaitSelection;
        Ok(vec![if updated {
            ENTRY_UPDATED.to_string()
        } else {
            format!("Entry with ID {} no longer exists.", entry_id)
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SledJournalStore;

    async fn seeded(texts: &[&str]) -> (SledJournalStore, Vec<u64>) {
        let store = SledJournalStore::temporary().expect("store");
        let mut ids = Vec::new();
        for t in texts {
            ids.push(store.insert_entry("alice", t, "general").await.unwrap().id);
        }
        (store, ids)
    }

    #[test]
    fn predicates_per_state() {
        assert!(BrowserState::AwaitSelection.accepts("42"));
        assert!(BrowserState::AwaitSelection.accepts("EXIT"));
        assert!(!BrowserState::AwaitSelection.accepts("4 2"));
        assert!(!BrowserState::AwaitSelection.accepts(""));
        assert!(!BrowserState::AwaitSelection.accepts("edit"));
        let action = BrowserState::AwaitAction { entry_id: 1 };
        assert!(action.accepts("Delete"));
        assert!(!action.accepts("7"));
        assert!(BrowserState::AwaitEditText { entry_id: 1 }.accepts(""));
        assert!(!BrowserState::Closed(CloseReason::Exit).accepts("exit"));
    }

    #[tokio::test]
    async fn empty_journal_closes_immediately() {
        let store = SledJournalStore::temporary().unwrap();
        let mut browser = EntryBrowser::new("alice", 50);
        let out = browser.start(&store).await.unwrap();
        assert_eq!(out, vec![NO_ENTRIES.to_string()]);
        assert_eq!(browser.close_reason(), Some(CloseReason::NoEntries));
        assert!(!browser.state().is_waiting());
    }

    #[tokio::test]
    async fn listing_shows_fixed_width_previews() {
        let long = "a".repeat(80);
        let (store, ids) = seeded(&[&long, "short"]).await;
        let mut browser = EntryBrowser::new("alice", 50);
        let out = browser.start(&store).await.unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with(LIST_HEADER));
        assert!(out[0].contains(&format!("🔖 ID: {} | ", ids[0])));
        assert!(out[0].contains(&format!("📝 Preview: {}...", "a".repeat(50))));
        assert!(!out[0].contains(&"a".repeat(51)));
        assert!(out[0].contains("📝 Preview: short..."));
        assert_eq!(out[1], SELECT_PROMPT);
        assert_eq!(browser.state(), &BrowserState::AwaitSelection);
    }

    #[tokio::test]
    async fn unknown_id_keeps_cache_and_state() {
        let (store, _ids) = seeded(&["one"]).await;
        let mut browser = EntryBrowser::new("alice", 50);
        browser.start(&store).await.unwrap();
        let before = browser.entries().to_vec();
        let step = browser.handle_reply("999999", &store).await.unwrap();
        assert_eq!(step, Step::Advanced(vec![INVALID_ID.to_string()]));
        let step = browser
            .handle_reply("99999999999999999999999", &store)
            .await
            .unwrap();
        assert_eq!(step, Step::Advanced(vec![INVALID_ID.to_string()]));
        assert_eq!(browser.entries(), before.as_slice());
        assert_eq!(browser.state(), &BrowserState::AwaitSelection);
    }

    #[tokio::test]
    async fn non_qualifying_replies_are_ignored() {
        let (store, ids) = seeded(&["one"]).await;
        let mut browser = EntryBrowser::new("alice", 50);
        browser.start(&store).await.unwrap();
        assert_eq!(browser.handle_reply("hello", &store).await.unwrap(), Step::Ignored);
        browser.handle_reply(&ids[0].to_string(), &store).await.unwrap();
        assert_eq!(browser.handle_reply("maybe", &store).await.unwrap(), Step::Ignored);
        assert_eq!(
            browser.state(),
            &BrowserState::AwaitAction { entry_id: ids[0] }
        );
    }

    #[tokio::test]
    async fn edit_updates_by_id_without_refreshing_cache() {
        let (store, ids) = seeded(&["same", "same"]).await;
        let mut browser = EntryBrowser::new("alice", 50);
        browser.start(&store).await.unwrap();
        browser.handle_reply(&ids[1].to_string(), &store).await.unwrap();
        let step = browser.handle_reply("EDIT", &store).await.unwrap();
        assert_eq!(step, Step::Advanced(vec![EDIT_PROMPT.to_string()]));
        let step = browser.handle_reply("edit", &store).await.unwrap();
        assert_eq!(step, Step::Advanced(vec![ENTRY_UPDATED.to_string()]));
        assert_eq!(browser.state(), &BrowserState::AwaitSelection);

        let stored = store.get_entries("alice").await.unwrap();
        assert_eq!(stored[0].text, "same");
        assert_eq!(stored[1].text, "edit");
        assert_eq!(browser.entries()[1].text, "same");
    }

    #[tokio::test]
    async fn delete_refreshes_cache() {
        let (store, ids) = seeded(&["keep", "drop"]).await;
        let mut browser = EntryBrowser::new("alice", 50);
        browser.start(&store).await.unwrap();
        browser.handle_reply(&ids[1].to_string(), &store).await.unwrap();
        let step = browser.handle_reply("delete", &store).await.unwrap();
        assert_eq!(
            step,
            Step::Advanced(vec![format!("Deleted entry with ID {}.", ids[1])])
        );
        assert_eq!(browser.entries().len(), 1);
        assert_eq!(browser.entries()[0].id, ids[0]);
        let step = browser.handle_reply(&ids[1].to_string(), &store).await.unwrap();
        assert_eq!(step, Step::Advanced(vec![INVALID_ID.to_string()]));
    }

    #[tokio::test]
    async fn list_refetches_and_rerenders() {
        let (store, ids) = seeded(&["one"]).await;
        let mut browser = EntryBrowser::new("alice", 50);
        browser.start(&store).await.unwrap();
        let added = store.insert_entry("alice", "two", "general").await.unwrap();
        browser.handle_reply(&ids[0].to_string(), &store).await.unwrap();
        let Step::Advanced(out) = browser.handle_reply("List", &store).await.unwrap() else {
            panic!("list should advance");
        };
        assert!(out[0].contains(&format!("🔖 ID: {} | ", added.id)));
        assert_eq!(browser.entries().len(), 2);
        assert_eq!(browser.state(), &BrowserState::AwaitSelection);
    }

    #[tokio::test]
    async fn timeouts_close_or_abort_edit() {
        let (store, ids) = seeded(&["one"]).await;
        let mut browser = EntryBrowser::new("alice", 50);
        browser.start(&store).await.unwrap();
        browser.handle_reply(&ids[0].to_string(), &store).await.unwrap();
        browser.handle_reply("edit", &store).await.unwrap();
        assert_eq!(browser.handle_timeout(), vec![EDIT_TIMED_OUT.to_string()]);
        assert_eq!(browser.state(), &BrowserState::AwaitSelection);
        assert_eq!(store.get_entries("alice").await.unwrap()[0].text, "one");

        assert_eq!(browser.handle_timeout(), vec![INACTIVITY.to_string()]);
        assert_eq!(browser.close_reason(), Some(CloseReason::Timeout));
        assert!(browser.handle_timeout().is_empty());
    }
}
