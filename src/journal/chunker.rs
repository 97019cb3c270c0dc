//! Chunked sender: splits long text into platform-sized messages.
//!
//! Limits are counted in characters (Unicode scalar values), which is how chat
//! platforms state their ceiling. Slicing always lands on a char boundary.
use anyhow::Result;
use log::trace;

use crate::transport::{Destination, MessageSink};

/// Hard per-message ceiling imposed by the chat transport.
pub const PLATFORM_MESSAGE_LIMIT: usize = 2000;

/// Split `text` into consecutive windows of at most `limit` characters.
///
/// Concatenating the result reproduces `text`. An empty string yields no chunks.
/// A `limit` of zero is treated as one.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let end = remaining
            .char_indices()
            .nth(limit)
            .map(|(idx, _)| idx)
            .unwrap_or(remaining.len());
        chunks.push(remaining[..end].to_string());
        remaining = &remaining[end..];
    }
    chunks
}

/// Deliver `text` to `to` as sequential chunks, awaiting each send before the next.
///
/// Returns the number of messages sent. The first failing send aborts the rest and its
/// error is returned unchanged.
pub async fn send_chunked(
    sink: &dyn MessageSink,
    to: &Destination,
    text: &str,
    limit: usize,
) -> Result<usize> {
    let chunks = chunk_text(text, limit);
    let total = chunks.len();
    for (i, chunk) in chunks.iter().enumerate() {
        trace!("send chunk {}/{} to {} ({} chars)", i + 1, total, to, chunk.chars().count());
        sink.send(to, chunk).await?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 2000).is_empty());
    }

    #[test]
    fn chunk_count_is_ceiling_of_length() {
        let text = "x".repeat(4001);
        let chunks = chunk_text(&text, 2000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2000);
        assert_eq!(chunks[2], "x");
        assert_eq!(chunks.concat(), text);

        let exact = "y".repeat(4000);
        assert_eq!(chunk_text(&exact, 2000).len(), 2);
    }

    #[test]
    fn splits_on_characters_not_bytes() {
        // each 'é' and '📝' is multi-byte; windows must count characters
        let text = "é📝".repeat(5);
        let chunks = chunk_text(&text, 3);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().take(3).all(|c| c.chars().count() == 3));
        assert_eq!(chunks[3].chars().count(), 1);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn zero_limit_does_not_loop_forever() {
        assert_eq!(chunk_text("abc", 0), vec!["a", "b", "c"]);
    }
}
