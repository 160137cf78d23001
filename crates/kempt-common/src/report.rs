//! The per-document message list.

use std::collections::HashSet;
use std::fmt;

use crate::message::{Message, MessageCode, Severity};
use crate::position::SourcePos;

/// Caller hook consulted for every new message. Returning `false` mutes the
/// message; it is still recorded and counted.
pub type MessageFilter = Box<dyn FnMut(&Message) -> bool + Send>;

/// Append-only list of the messages produced while processing one document.
#[derive(Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    muted: HashSet<MessageCode>,
    filter: Option<MessageFilter>,
    errors: usize,
    warnings: usize,
    infos: usize,
    config_errors: usize,
}

impl fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageLog")
            .field("messages", &self.messages)
            .field("muted", &self.muted)
            .field("has_filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

impl MessageLog {
    /// Create an empty log with nothing muted and no filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of muted message codes.
    pub fn set_muted<I: IntoIterator<Item = MessageCode>>(&mut self, codes: I) {
        self.muted = codes.into_iter().collect();
    }

    /// True when messages with `code` are muted by configuration.
    #[must_use]
    pub fn is_muted(&self, code: MessageCode) -> bool {
        self.muted.contains(&code)
    }

    /// Install the caller's message filter, replacing any previous one.
    pub fn set_filter(&mut self, filter: MessageFilter) {
        self.filter = Some(filter);
    }

    /// Remove the caller's message filter.
    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    /// Record a message and return a reference to it.
    ///
    /// The message is muted if its code is in the mute list, or if the filter
    /// rejects it. The filter sees every message, muted or not, in the order
    /// the messages occur.
    pub fn report(
        &mut self,
        code: MessageCode,
        pos: Option<SourcePos>,
        args: Vec<String>,
    ) -> &Message {
        let mut message = Message::new(code, pos, args);
        message.muted = self.muted.contains(&code);
        if let Some(filter) = self.filter.as_mut()
            && !filter(&message)
        {
            message.muted = true;
        }
        log::trace!("{}: {}", message.key(), message.text());
        self.count(&message);
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Record a message that was produced elsewhere, e.g. by the lexer.
    pub fn push(&mut self, message: Message) {
        let Message { code, pos, args, .. } = message;
        let _ = self.report(code, pos, args);
    }

    fn count(&mut self, message: &Message) {
        if message.code.is_config() {
            self.config_errors += 1;
            return;
        }
        match message.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.infos += 1,
        }
    }

    /// All messages in the order they were reported.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of error-severity markup messages.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors
    }

    /// Number of warning-severity markup messages.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Number of informational messages.
    #[must_use]
    pub const fn info_count(&self) -> usize {
        self.infos
    }

    /// Number of configuration problems.
    #[must_use]
    pub const fn config_error_count(&self) -> usize {
        self.config_errors
    }

    /// True if any message with `code` was recorded.
    #[must_use]
    pub fn contains(&self, code: MessageCode) -> bool {
        self.messages.iter().any(|m| m.code == code)
    }

    /// Iterate over the messages with `code`.
    pub fn with_code(&self, code: MessageCode) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn counts_by_severity_and_keeps_config_apart() {
        let mut log = MessageLog::new();
        let _ = log.report(MessageCode::MissingEndtagFor, None, vec!["b".into()]);
        let _ = log.report(MessageCode::UnknownElement, None, vec!["foo".into()]);
        let _ = log.report(MessageCode::InsertingTag, None, vec!["body".into()]);
        let _ = log.report(MessageCode::UnknownOption, None, vec!["frob".into()]);
        assert_eq!(log.warning_count(), 1);
        assert_eq!(log.error_count(), 1);
        assert_eq!(log.info_count(), 1);
        assert_eq!(log.config_error_count(), 1);
        assert_eq!(log.messages().len(), 4);
    }

    #[test]
    fn muted_codes_are_recorded_and_counted() {
        let mut log = MessageLog::new();
        log.set_muted([MessageCode::MissingEndtagFor]);
        let muted = log
            .report(MessageCode::MissingEndtagFor, None, vec!["b".into()])
            .muted;
        assert!(muted);
        assert!(log.is_muted(MessageCode::MissingEndtagFor));
        assert!(!log.is_muted(MessageCode::MissingDoctype));
        assert_eq!(log.warning_count(), 1);
    }

    #[test]
    fn filter_sees_messages_in_order_and_can_mute() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut log = MessageLog::new();
        log.set_filter(Box::new(move |m| {
            sink.lock().unwrap().push(m.key());
            m.code != MessageCode::InsertingTag
        }));
        let _ = log.report(MessageCode::InsertingTag, None, vec!["body".into()]);
        let _ = log.report(MessageCode::MissingDoctype, None, Vec::new());
        assert_eq!(*seen.lock().unwrap(), vec!["INSERTING_TAG", "MISSING_DOCTYPE"]);
        assert!(log.messages()[0].muted);
        assert!(!log.messages()[1].muted);

        log.clear_filter();
        let _ = log.report(MessageCode::InsertingTag, None, vec!["head".into()]);
        assert!(!log.messages()[2].muted);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
