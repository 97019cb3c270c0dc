//! Entry writer: one-shot `write <content>` handling.
use anyhow::Result;
use log::info;

use crate::logutil::escape_log;
use crate::storage::JournalStore;

/// Separator between entry text and its tag string.
pub const TAG_MARKER: &str = "|tags:";

/// Entry text and tags resolved from a `write` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub text: String,
    pub tags: String,
}

/// Split `content` on the first `|tags:` marker.
///
/// Both halves are trimmed. Without a marker the whole trimmed input is the entry text
/// and `default_tags` applies. Tag format and entry length are not checked.
pub fn parse_entry(content: &str, default_tags: &str) -> ParsedEntry {
    match content.split_once(TAG_MARKER) {
        Some((text, tags)) => ParsedEntry {
            text: text.trim().to_string(),
            tags: tags.trim().to_string(),
        },
        None => ParsedEntry {
            text: content.trim().to_string(),
            tags: default_tags.to_string(),
        },
    }
}

/// Persist a new entry for `username` and return the confirmation line.
pub async fn write_entry(
    store: &dyn JournalStore,
    username: &str,
    content: &str,
    default_tags: &str,
) -> Result<String> {
    let parsed = parse_entry(content, default_tags);
    let entry = store
        .insert_entry(username, &parsed.text, &parsed.tags)
        .await?;
    info!(
        "journal.write user={} id={} tags={}",
        escape_log(username),
        entry.id,
        escape_log(&entry.tags)
    );
    Ok(format!(
        "📘 New journal entry added with tags: {}.",
        parsed.tags
    ))
}
