//! # Transport Module - Chat Platform Boundary
//!
//! The journal bot does not own a chat platform connection. Inbound traffic arrives as
//! [`TextEvent`]s pushed into the bot's event queue, and every reply leaves through a
//! [`MessageSink`]. Anything that can produce events and accept outgoing text (a
//! chat-service gateway, the bundled console adapter, a test harness) can drive the bot.
//!
//! ## Event Types
//!
//! - [`TextEvent`] - one message typed by a user, either in a shared channel or as a DM
//! - [`OutgoingMessage`] - one message the bot wants delivered
//!
//! ## Sinks
//!
//! - [`ChannelSink`] - forwards outgoing messages into a tokio mpsc channel
//!
//! Sends are awaited one at a time by callers; a sink error is returned as-is and never
//! retried.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

pub mod console;

/// Where an outgoing message should be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Private channel with the named user (created on demand by the platform).
    Direct(String),
    /// A shared channel, addressed by its platform identifier.
    Channel(String),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Direct(user) => write!(f, "dm {}", user),
            Destination::Channel(id) => write!(f, "#{}", id),
        }
    }
}

/// Inbound text from the platform.
#[derive(Debug, Clone)]
pub struct TextEvent {
    /// Stable display identity of the author; doubles as the journal owner key.
    pub author: String,
    /// `None` for a direct message, otherwise the shared channel it was posted in.
    pub channel: Option<String>,
    pub content: String,
}

impl TextEvent {
    pub fn direct(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            channel: None,
            content: content.into(),
        }
    }

    pub fn in_channel(
        author: impl Into<String>,
        channel: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            channel: Some(channel.into()),
            content: content.into(),
        }
    }

    pub fn is_direct(&self) -> bool {
        self.channel.is_none()
    }

    /// Destination that answers in the same place the event came from.
    pub fn reply_destination(&self) -> Destination {
        match &self.channel {
            Some(id) => Destination::Channel(id.clone()),
            None => Destination::Direct(self.author.clone()),
        }
    }
}

/// Outgoing message handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: Destination,
    pub content: String,
}

/// Delivery side of the platform.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, to: &Destination, content: &str) -> Result<()>;
}

/// Sink that queues outgoing messages on an unbounded mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OutgoingMessage>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<OutgoingMessage>) -> Self {
        Self { tx }
    }

    /// Convenience constructor returning the sink together with its receiving end.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<OutgoingMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send(&self, to: &Destination, content: &str) -> Result<()> {
        self.tx
            .send(OutgoingMessage {
                to: to.clone(),
                content: content.to_string(),
            })
            .map_err(|e| anyhow!("outgoing channel closed: {}", e))
    }
}
