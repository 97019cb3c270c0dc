//! Helpers for putting user-typed text into log lines.
//!
//! Journal entries are free-form and often multi-line; logged verbatim they would split
//! a record across lines and bloat the log with whole diary pages.
use std::borrow::Cow;
use std::fmt::Write;

/// Longest stretch of user text copied into a single log line.
pub const LOG_PREVIEW_CHARS: usize = 120;

fn needs_escape(c: char) -> bool {
    c == '\\' || c.is_control()
}

/// Escape control characters and cap length so `s` fits on one log line.
///
/// Newlines, carriage returns and tabs become `\n`, `\r`, `\t`; other control characters
/// become `\xNN`; backslashes are doubled. Text past [`LOG_PREVIEW_CHARS`] is replaced by `…`.
pub fn escape_log(s: &str) -> Cow<'_, str> {
    let over_length = s.chars().nth(LOG_PREVIEW_CHARS).is_some();
    if !over_length && !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len().min(LOG_PREVIEW_CHARS * 4) + 4);
    for c in s.chars().take(LOG_PREVIEW_CHARS) {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    if over_length {
        out.push('…');
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(escape_log("Slept well 📓"), Cow::Borrowed(_)));
    }

    #[test]
    fn escapes_line_breaks() {
        assert_eq!(escape_log("Dear diary,\r\n\ttoday"), "Dear diary,\\r\\n\\ttoday");
        assert_eq!(escape_log("a\\b\u{7}"), "a\\\\b\\x07");
    }

    #[test]
    fn truncates_long_entries() {
        let long = "z".repeat(LOG_PREVIEW_CHARS + 10);
        let escaped = escape_log(&long);
        assert_eq!(escaped.chars().count(), LOG_PREVIEW_CHARS + 1);
        assert!(escaped.ends_with('…'));
    }
}
