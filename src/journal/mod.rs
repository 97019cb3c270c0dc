//! # Journal Core
//!
//! The journal logic proper, independent of any chat platform or database:
//!
//! - [`chunker`] - split long text into transport-sized messages and send them in order
//! - [`browser`] - the list/view/edit/delete dialogue as an explicit state machine
//! - [`runner`] - feeds a browser from a per-session reply queue with a reply timeout
//! - [`writer`] - parse and persist `write <content>` invocations
//!
//! ## Dialogue Lifecycle
//!
//! 1. User sends `journal`; the bot opens a session with its own reply queue
//! 2. The browser lists entries (or closes at once when there are none)
//! 3. The user picks an id, then `edit`, `delete`, `list` or `exit`
//! 4. The session ends on `exit`, on reply timeout, or when the bot drops its queue

use std::time::Duration;

use crate::config::BotConfig;

pub mod browser;
pub mod chunker;
pub mod runner;
pub mod writer;

pub use browser::{BrowserState, CloseReason, EntryBrowser, Step};
pub use chunker::{chunk_text, send_chunked, PLATFORM_MESSAGE_LIMIT};
pub use runner::run_browser;
pub use writer::{parse_entry, write_entry, ParsedEntry};

/// Per-session knobs taken from `[bot]` configuration.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub preview_chars: usize,
    pub reply_timeout: Duration,
    pub max_message_chars: usize,
}

impl BrowserSettings {
    pub fn from_config(bot: &BotConfig) -> Self {
        Self {
            preview_chars: bot.preview_chars,
            reply_timeout: Duration::from_secs(bot.reply_timeout_secs),
            max_message_chars: bot.max_message_chars,
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            preview_chars: 50,
            reply_timeout: Duration::from_secs(60),
            max_message_chars: PLATFORM_MESSAGE_LIMIT,
        }
    }
}
