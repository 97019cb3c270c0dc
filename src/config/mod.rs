//! # Configuration Management Module
//!
//! Centralized configuration for the journal bot, loaded from a TOML file.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - command prefix, message limits, reply timeout, preview width
//! - [`StorageConfig`] - where the sled journal database lives
//! - [`LoggingConfig`] - log level and optional log file
//! - [`ConsoleConfig`] - console adapter defaults
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dmjournal::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Prefix: {}", config.bot.command_prefix);
//!     Config::create_default("config.example.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "Journal"
//! command_prefix = "!"
//! max_message_chars = 2000
//! reply_timeout_secs = 60
//! preview_chars = 50
//! default_tags = "general"
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "dmjournal.log"
//! ```
//!
//! Every section may be omitted; missing sections and fields take their defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::journal::PLATFORM_MESSAGE_LIMIT;

/// Longest accepted reply wait: one day.
pub const MAX_REPLY_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub name: String,
    /// Prefix that marks a line as a command, e.g. `!journal`.
    pub command_prefix: String,
    /// Per-message character ceiling; longer output is chunked. At most 2000.
    pub max_message_chars: usize,
    /// Seconds to wait for each dialogue reply before giving up. At most one day.
    pub reply_timeout_secs: u64,
    /// Characters of entry text shown per line in the listing.
    pub preview_chars: usize,
    /// Tag string used when `write` carries no `|tags:` section.
    pub default_tags: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Journal".to_string(),
            command_prefix: "!".to_string(),
            max_message_chars: PLATFORM_MESSAGE_LIMIT,
            reply_timeout_secs: 60,
            preview_chars: 50,
            default_tags: "general".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

impl StorageConfig {
    /// Directory holding the sled database.
    pub fn journal_db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("journal")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("dmjournal.log".to_string()),
        }
    }
}

impl LoggingConfig {
    /// Parse `level`, falling back to `Info` for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Author used for console lines without a `name:` / `name>` prefix.
    pub default_user: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_user: "console".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config
            .validate()
            .map_err(|e| anyhow!("Invalid config file {}: {}", path, e))?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the bot cannot run with.
    pub fn validate(&self) -> Result<()> {
        let bot = &self.bot;
        if bot.max_message_chars == 0 || bot.max_message_chars > PLATFORM_MESSAGE_LIMIT {
            return Err(anyhow!(
                "bot.max_message_chars must be between 1 and {} (got {})",
                PLATFORM_MESSAGE_LIMIT,
                bot.max_message_chars
            ));
        }
        if bot.reply_timeout_secs == 0 || bot.reply_timeout_secs > MAX_REPLY_TIMEOUT_SECS {
            return Err(anyhow!(
                "bot.reply_timeout_secs must be between 1 and {} (got {})",
                MAX_REPLY_TIMEOUT_SECS,
                bot.reply_timeout_secs
            ));
        }
        if bot.command_prefix.trim().is_empty() {
            return Err(anyhow!("bot.command_prefix must not be empty"));
        }
        if bot.default_tags.trim().is_empty() {
            return Err(anyhow!("bot.default_tags must not be empty"));
        }
        Ok(())
    }
}
