//! Console adapter: drives the bot from stdin and prints replies to stdout.
//!
//! Input lines:
//! - `alice: !write Slept well` - alice posts in the shared `console` channel
//! - `alice> 3` - alice sends a direct message to the bot
//! - `exit` - no author prefix, sent as a DM from the configured default user
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Destination, OutgoingMessage, TextEvent};
use crate::logutil::escape_log;

/// Name of the shared channel console users post into.
pub const CONSOLE_CHANNEL: &str = "console";

/// Parse one console line into an event. Blank lines yield `None`.
pub fn parse_console_line(line: &str, default_user: &str) -> Option<TextEvent> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.trim().is_empty() {
        return None;
    }
    let public = line.find(": ").map(|pos| (pos, false));
    let direct = line.find("> ").map(|pos| (pos, true));
    let split = match (public, direct) {
        (Some(a), Some(b)) => Some(if a.0 < b.0 { a } else { b }),
        (a, b) => a.or(b),
    };
    if let Some((pos, is_direct)) = split {
        let name = &line[..pos];
        if !name.is_empty() && !name.chars().any(char::is_whitespace) {
            let content = &line[pos + 2..];
            return Some(if is_direct {
                TextEvent::direct(name, content)
            } else {
                TextEvent::in_channel(name, CONSOLE_CHANNEL, content)
            });
        }
    }
    Some(TextEvent::direct(default_user, line))
}

/// Render an outgoing message the way the console prints it.
pub fn format_outgoing(msg: &OutgoingMessage) -> String {
    match &msg.to {
        Destination::Direct(user) => format!("[dm {}] {}", user, msg.content),
        Destination::Channel(id) => format!("[#{}] {}", id, msg.content),
    }
}

/// Read stdin line by line and push parsed events until EOF or the bot goes away.
pub fn spawn_reader(
    default_user: String,
    events: mpsc::UnboundedSender<TextEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(event) = parse_console_line(&line, &default_user) else {
                        continue;
                    };
                    debug!(
                        "console in author={} direct={} content={}",
                        event.author,
                        event.is_direct(),
                        escape_log(&event.content)
                    );
                    if events.send(event).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("console input closed");
                    break;
                }
                Err(e) => {
                    warn!("console read error: {}", e);
                    break;
                }
            }
        }
    })
}

/// Print outgoing messages until every sink handle is dropped.
pub fn spawn_writer(mut outgoing: mpsc::UnboundedReceiver<OutgoingMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = outgoing.recv().await {
            let line = format!("{}\n", format_outgoing(&msg));
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                warn!("console write error: {}", e);
                break;
            }
            let _ = stdout.flush().await;
        }
    })
}

/// Wait for the writer to print everything it was handed.
///
/// Returns `false` when the writer task panicked or was cancelled.
pub async fn join_writer(writer: JoinHandle<()>) -> bool {
    match writer.await {
        Ok(()) => true,
        Err(e) => {
            warn!("console writer did not finish cleanly: {}", e);
            false
        }
    }
}
