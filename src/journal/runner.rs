//! Drives an [`EntryBrowser`] from a per-session reply queue.
//!
//! The runner owns the only suspension points of a session: waiting on the inbox with
//! a deadline, and awaiting each outbound chunk. Nothing here overlaps.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, trace};
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

use super::browser::{CloseReason, EntryBrowser, Step};
use super::chunker::send_chunked;
use super::BrowserSettings;
use crate::logutil::escape_log;
use crate::storage::JournalStore;
use crate::transport::{Destination, MessageSink};

async fn deliver(
    sink: &dyn MessageSink,
    to: &Destination,
    messages: Vec<String>,
    limit: usize,
) -> Result<()> {
    for msg in messages {
        send_chunked(sink, to, &msg, limit).await?;
    }
    Ok(())
}

/// Far-future stand-in used when a timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn reply_deadline(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Run one browsing session to completion.
///
/// Replies are read from `inbox`; every message the browser emits goes to the owner's
/// direct channel. Store and sink errors end the session and are returned to the caller.
/// Closing the inbox ends the session silently with [`CloseReason::Dropped`].
pub async fn run_browser(
    mut browser: EntryBrowser,
    store: Arc<dyn JournalStore>,
    sink: Arc<dyn MessageSink>,
    mut inbox: mpsc::UnboundedReceiver<String>,
    settings: BrowserSettings,
) -> Result<CloseReason> {
    let to = Destination::Direct(browser.username().to_string());
    let limit = settings.max_message_chars;

    let opening = browser.start(store.as_ref()).await?;
    deliver(sink.as_ref(), &to, opening, limit).await?;

    while !browser.is_closed() {
        let deadline = reply_deadline(settings.reply_timeout);
        loop {
            match timeout_at(deadline, inbox.recv()).await {
                Err(_) => {
                    let out = browser.handle_timeout();
                    deliver(sink.as_ref(), &to, out, limit).await?;
                    break;
                }
                Ok(None) => {
                    browser.close(CloseReason::Dropped);
                    break;
                }
                Ok(Some(reply)) => match browser.handle_reply(&reply, store.as_ref()).await? {
                    Step::Ignored => {
                        trace!(
                            "session {} ignored reply {}",
                            escape_log(browser.username()),
                            escape_log(&reply)
                        );
                    }
                    Step::Advanced(out) => {
                        deliver(sink.as_ref(), &to, out, limit).await?;
                        break;
                    }
                },
            }
        }
    }

    let reason = browser.close_reason().unwrap_or(CloseReason::Dropped);
    debug!(
        "session {} finished: {:?}",
        escape_log(browser.username()),
        reason
    );
    Ok(reason)
}
