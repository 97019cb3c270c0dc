use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::commands::{CommandParser, JournalCommand};
use crate::config::Config;
use crate::journal::{
    run_browser, send_chunked, write_entry, BrowserSettings, CloseReason, EntryBrowser,
};
use crate::logutil::escape_log;
use crate::storage::JournalStore;
use crate::transport::{Destination, MessageSink, TextEvent};

struct SessionHandle {
    inbox: mpsc::UnboundedSender<String>,
    task: JoinHandle<Result<CloseReason>>,
}

/// # Journal Bot - Event Router
///
/// Owns the command parser and the table of open browsing sessions, and routes every
/// inbound [`TextEvent`]:
///
/// - prefixed commands (`journal`, `write`, `help`) are executed
/// - any other text from an author with an open session is queued to that session
/// - everything else is ignored
///
/// ```text
/// ┌──────────────┐  TextEvent   ┌──────────────┐  replies   ┌──────────────────┐
/// │  Transport   │────────────→ │  JournalBot  │──────────→ │ session task (1  │
/// │  (platform)  │              │  (router)    │            │ per active user) │
/// └──────────────┘              └──────────────┘            └──────────────────┘
///        ▲                             │                            │
///        └──────── MessageSink ◄───────┴──────── JournalStore ──────┘
/// ```
///
/// Each session runs on its own tokio task with its own queue, so users never wait on
/// one another. The store and sink are shared handles injected at construction.
pub struct JournalBot {
    config: Config,
    settings: BrowserSettings,
    store: Arc<dyn JournalStore>,
    sink: Arc<dyn MessageSink>,
    parser: CommandParser,
    sessions: HashMap<String, SessionHandle>,
    /// Superseded sessions still winding down after losing their inbox.
    retired: Vec<JoinHandle<Result<CloseReason>>>,
}

impl JournalBot {
    pub fn new(config: Config, store: Arc<dyn JournalStore>, sink: Arc<dyn MessageSink>) -> Self {
        let settings = BrowserSettings::from_config(&config.bot);
        let parser = CommandParser::new(config.bot.command_prefix.clone());
        Self {
            config,
            settings,
            store,
            sink,
            parser,
            sessions: HashMap::new(),
            retired: Vec::new(),
        }
    }

    /// Process events until the stream closes or Ctrl-C is received.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<TextEvent>) -> Result<()> {
        info!(
            "Journal bot '{}' listening (prefix '{}', reply timeout {}s)",
            self.config.bot.name,
            self.parser.prefix(),
            self.config.bot.reply_timeout_secs
        );
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(ev) => {
                            if let Err(e) = self.route_text_event(ev).await {
                                warn!("route_text_event error: {e:?}");
                            }
                        }
                        None => {
                            info!("Event stream closed");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }
        self.shutdown().await;
        Ok(())
    }

    /// Route a single inbound event. Store and sink failures are returned to the caller.
    pub async fn route_text_event(&mut self, ev: TextEvent) -> Result<()> {
        self.prune_finished_sessions();
        match self.parser.parse(&ev.content) {
            Some(cmd) => self.handle_command(&ev, cmd).await,
            None => {
                self.forward_reply(&ev);
                Ok(())
            }
        }
    }

    fn forward_reply(&mut self, ev: &TextEvent) {
        let Some(handle) = self.sessions.get(&ev.author) else {
            return;
        };
        if handle.inbox.send(ev.content.clone()).is_err() {
            debug!("session for {} already finished", escape_log(&ev.author));
            self.sessions.remove(&ev.author);
        }
    }

    async fn handle_command(&mut self, ev: &TextEvent, cmd: JournalCommand) -> Result<()> {
        match cmd {
            JournalCommand::Journal => {
                self.open_session(&ev.author);
                Ok(())
            }
            JournalCommand::Write(content) => {
                let to = ev.reply_destination();
                if content.is_empty() {
                    return self.reply(&to, &self.parser.write_usage()).await;
                }
                let confirmation = write_entry(
                    self.store.as_ref(),
                    &ev.author,
                    &content,
                    &self.config.bot.default_tags,
                )
                .await?;
                self.reply(&to, &confirmation).await
            }
            JournalCommand::Help => {
                let text = self.parser.help_text(&self.config.bot.name);
                self.reply(&ev.reply_destination(), &text).await
            }
        }
    }

    async fn reply(&self, to: &Destination, text: &str) -> Result<()> {
        send_chunked(self.sink.as_ref(), to, text, self.settings.max_message_chars).await?;
        Ok(())
    }

    /// Start a browsing session for `author`, replacing any session already open.
    fn open_session(&mut self, author: &str) {
        if let Some(SessionHandle { inbox, task }) = self.sessions.remove(author) {
            // dropping the old inbox ends that session without a notice
            debug!("superseding open journal session for {}", escape_log(author));
            drop(inbox);
            self.retired.push(task);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let browser = EntryBrowser::new(author, self.settings.preview_chars);
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let settings = self.settings.clone();
        let user = author.to_string();
        let task = tokio::spawn(async move {
            let result = run_browser(browser, store, sink, rx, settings).await;
            match &result {
                Ok(reason) => info!(
                    "journal.session.end user={} reason={:?}",
                    escape_log(&user),
                    reason
                ),
                Err(e) => warn!("journal session for {} failed: {e:?}", escape_log(&user)),
            }
            result
        });
        self.sessions
            .insert(author.to_string(), SessionHandle { inbox: tx, task });
        info!(
            "journal.session.start user={} active={}",
            escape_log(author),
            self.sessions.len()
        );
    }

    fn prune_finished_sessions(&mut self) {
        self.sessions.retain(|_, handle| !handle.task.is_finished());
        self.retired.retain(|task| !task.is_finished());
    }

    /// Number of sessions whose task is still running.
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .values()
            .filter(|h| !h.task.is_finished())
            .count()
    }

    pub fn has_session(&self, author: &str) -> bool {
        self.sessions
            .get(author)
            .map(|h| !h.task.is_finished())
            .unwrap_or(false)
    }

    /// Wait for `author`'s session to finish on its own and return how it ended.
    ///
    /// The session keeps its inbox while waiting, so it only ends through its own
    /// dialogue (exit, timeout, empty journal) or an error.
    pub async fn join_session(&mut self, author: &str) -> Option<Result<CloseReason>> {
        let SessionHandle { inbox, task } = self.sessions.remove(author)?;
        let joined = task
            .await
            .map_err(|e| anyhow!("journal session task for {} panicked: {}", author, e));
        drop(inbox);
        Some(joined.and_then(|result| result))
    }

    async fn shutdown(&mut self) {
        info!("Shutting down journal bot...");
        for task in self.retired.drain(..) {
            if let Err(e) = task.await {
                warn!("superseded session task did not finish cleanly: {}", e);
            }
        }
        for (user, SessionHandle { inbox, task }) in self.sessions.drain() {
            drop(inbox);
            match task.await {
                Ok(Ok(reason)) => debug!("closed session {}: {:?}", escape_log(&user), reason),
                Ok(Err(e)) => debug!("session {} ended with error: {e}", escape_log(&user)),
                Err(e) => warn!("session task {} did not finish cleanly: {}", escape_log(&user), e),
            }
        }
        info!("Journal bot shutdown complete");
    }
}
