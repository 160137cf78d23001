//! Colored terminal output for messages and notices.
//!
//! Messages are rendered with their severity highlighted. Notices (things the
//! tool wants to tell the user that are not markup defects, such as an
//! encoding fallback) are deduplicated so that processing many files does not
//! repeat the same line.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Mutex;

use owo_colors::OwoColorize;

use crate::message::{Message, Severity};

/// Notices already printed, so each one appears once per process.
static NOTIFIED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Print a notice to stderr once per unique `(component, message)` pair.
///
/// # Example
/// ```ignore
/// notice_once("encoding", "unknown charset 'x-foo', reading as UTF-8");
/// ```
pub fn notice_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = NOTIFIED
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[kempt {component}] {message}").yellow());
    }
}

/// Write one rendered message, optionally colored by severity. With
/// `show_key` the message key is appended, e.g. `(MISSING_ENDTAG_FOR)`.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_message<W: Write + ?Sized>(
    out: &mut W,
    message: &Message,
    emacs_file: Option<&str>,
    color: bool,
    show_key: bool,
) -> io::Result<()> {
    let mut line = message.render(emacs_file);
    if show_key {
        line.push_str(&format!(" ({})", message.key()));
    }
    if !color {
        return writeln!(out, "{line}");
    }
    match message.severity {
        Severity::Error => writeln!(out, "{}", line.red().bold()),
        Severity::Warning => writeln!(out, "{}", line.yellow()),
        Severity::Info => writeln!(out, "{}", line.dimmed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageCode;
    use crate::position::SourcePos;

    #[test]
    fn plain_output_has_no_escape_codes() {
        let msg = Message::new(
            MessageCode::MissingEndtagFor,
            Some(SourcePos::new(2, 1)),
            vec!["b".into()],
        );
        let mut out = Vec::new();
        write_message(&mut out, &msg, None, false, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "line 2 column 1 - Warning: missing </b>\n"
        );
    }

    #[test]
    fn colored_output_keeps_the_text() {
        let msg = Message::new(MessageCode::UnknownElement, None, vec!["blink".into()]);
        let mut out = Vec::new();
        write_message(&mut out, &msg, None, true, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: <blink> is not recognized!"));
        assert!(text.contains('\u{1b}'));
    }

    #[test]
    fn key_is_appended_on_request() {
        let msg = Message::new(MessageCode::MissingDoctype, None, Vec::new());
        let mut out = Vec::new();
        write_message(&mut out, &msg, Some("page.html"), false, true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "page.html: Warning: missing <!DOCTYPE> declaration (MISSING_DOCTYPE)\n"
        );
    }
}
