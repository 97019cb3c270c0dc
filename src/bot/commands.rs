//! Prefix command parser for the journal bot.
//!
//! Recognizes `journal`, `write <content>` and `help` only when the line starts with the
//! configured prefix (default `!`). Command names are case-sensitive. Anything that does
//! not parse is ordinary text and may be a reply to an open dialogue.
use log::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalCommand {
    /// Open the entry browser in the author's DM. Extra words are ignored.
    Journal,
    /// Add an entry; carries everything after the command name, trimmed.
    Write(String),
    Help,
}

#[derive(Debug, Clone)]
pub struct CommandParser {
    prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, raw: &str) -> Option<JournalCommand> {
        let body = raw.trim_start().strip_prefix(self.prefix.as_str())?;
        let (name, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
        let cmd = match name {
            "journal" => JournalCommand::Journal,
            "write" => JournalCommand::Write(rest.trim().to_string()),
            "help" => JournalCommand::Help,
            _ => return None,
        };
        trace!("parsed command {:?}", cmd);
        Some(cmd)
    }

    pub fn help_text(&self, bot_name: &str) -> String {
        let p = &self.prefix;
        format!(
            "📓 {} commands:\n\
             {p}journal - browse, edit and delete your entries (opens a DM)\n\
             {p}write <text> [|tags: tag1,tag2] - add a new entry\n\
             {p}help - show this message",
            bot_name,
            p = p
        )
    }

    pub fn write_usage(&self) -> String {
        format!("Usage: {}write <content> [|tags: tag1,tag2]", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        let p = CommandParser::new("!");
        assert_eq!(p.parse("!journal"), Some(JournalCommand::Journal));
        assert_eq!(p.parse("!journal please"), Some(JournalCommand::Journal));
        assert_eq!(
            p.parse("!write Hello world |tags: mood,work"),
            Some(JournalCommand::Write("Hello world |tags: mood,work".into()))
        );
        assert_eq!(
            p.parse("!write\nmulti\nline"),
            Some(JournalCommand::Write("multi\nline".into()))
        );
        assert_eq!(p.parse("!write"), Some(JournalCommand::Write(String::new())));
        assert_eq!(p.parse("!help"), Some(JournalCommand::Help));
    }

    #[test]
    fn ignores_plain_text_and_unknown_commands() {
        let p = CommandParser::new("!");
        assert_eq!(p.parse("journal"), None);
        assert_eq!(p.parse("12"), None);
        assert_eq!(p.parse("!Journal"), None);
        assert_eq!(p.parse("!writer x"), None);
    }

    #[test]
    fn custom_prefix() {
        let p = CommandParser::new("j.");
        assert_eq!(p.parse("j.journal"), Some(JournalCommand::Journal));
        assert_eq!(p.parse("!journal"), None);
        assert!(p.help_text("Diary").contains("j.write <text>"));
    }
}
