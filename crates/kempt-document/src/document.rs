//! The document session.

use std::any::Any;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;

use kempt_common::warning::write_message;
use kempt_common::{Message, MessageCode, MessageLog, Severity, SourcePos};
use kempt_config::{
    AutoBool, ConfigError, DetectedDoctype, DoctypeChoice, Encoding, OptionId, OptionStore,
    OptionValue, parse_config,
};
use kempt_dom::DomTree;
use kempt_html::encoding::{decode, encoding_for_label};
use kempt_html::{BuilderOptions, parse_document};
use kempt_print::{OutputSink, PrettyPrintRecord, PrettyPrinter, PrintOptions, PrintedDocument};

use crate::cleanup;
use crate::diagnostics::{content_version, doctype_given};
use crate::error::DocumentError;
use crate::status::Status;

/// Claims an option name the store does not know. Receives the name and the
/// value; returning `true` means the caller handled it.
pub type UnknownOptionHook = Box<dyn FnMut(&str, &str) -> bool + Send>;

/// Receives each [`PrettyPrintRecord`] while a document is saved.
pub type ProgressHook = Box<dyn FnMut(&PrettyPrintRecord) + Send>;

/// One HTML document and everything needed to process it: options, the
/// repaired tree, messages and status.
///
/// The usual sequence is parse, [`Document::clean_and_repair`],
/// [`Document::run_diagnostics`], then one of the `save_*` methods.
#[derive(Default)]
pub struct Document {
    pub(crate) options: OptionStore,
    pub(crate) log: MessageLog,
    pub(crate) tree: Option<DomTree>,
    detected_doctype: DetectedDoctype,
    input_encoding: Option<Encoding>,
    detected_encoding: Option<Encoding>,
    halted: bool,
    body_was_implicit: bool,
    body_only: bool,
    records: Vec<PrettyPrintRecord>,
    unknown_option_hook: Option<UnknownOptionHook>,
    progress: Option<ProgressHook>,
    app_data: Option<Box<dyn Any + Send>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("options", &self.options)
            .field("log", &self.log)
            .field("parsed", &self.tree.is_some())
            .field("detected_doctype", &self.detected_doctype)
            .field("halted", &self.halted)
            .field("body_only", &self.body_only)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// A document with default options and nothing parsed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ===== OPTIONS =====

    /// The option store.
    #[must_use]
    pub const fn options(&self) -> &OptionStore {
        &self.options
    }

    /// The option store, for direct typed updates.
    pub const fn options_mut(&mut self) -> &mut OptionStore {
        &mut self.options
    }

    /// Set an option by name.
    ///
    /// Names the store does not know are offered to the unknown-option hook
    /// first. Anything left unhandled is recorded as a configuration message
    /// as well as returned.
    ///
    /// # Errors
    ///
    /// The [`ConfigError`] describing why the value was rejected.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        self.apply_setting(name, value, None)
    }

    /// Apply the settings in a config file's text. Problems become
    /// configuration messages; returns how many there were.
    pub fn load_config_str(&mut self, text: &str) -> usize {
        let mut problems = 0;
        for entry in parse_config(text) {
            let pos = SourcePos::new(entry.line, 1);
            if self.apply_setting(&entry.name, &entry.value, Some(pos)).is_err() {
                problems += 1;
            }
        }
        log::debug!("config loaded with {problems} problem(s)");
        problems
    }

    /// Read and apply a config file.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Config`] when the file cannot be read.
    pub fn load_config_file(&mut self, path: &Path) -> Result<usize, DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.load_config_str(&text))
    }

    /// Take every option value from `other`.
    pub fn copy_config_from(&mut self, other: &Self) {
        self.options.copy_from(&other.options);
    }

    /// Read the input with the encoding called `label` (any WHATWG label,
    /// e.g. `"iso-8859-1"` or `"sjis"`), overriding `input-encoding`.
    ///
    /// # Errors
    ///
    /// [`DocumentError::UnsupportedEncoding`] for labels kempt cannot decode.
    pub fn set_input_charset(&mut self, label: &str) -> Result<(), DocumentError> {
        let encoding = encoding_for_label(label)
            .ok_or_else(|| DocumentError::UnsupportedEncoding(label.to_owned()))?;
        self.input_encoding = Some(encoding);
        Ok(())
    }

    fn apply_setting(
        &mut self,
        name: &str,
        value: &str,
        pos: Option<SourcePos>,
    ) -> Result<(), ConfigError> {
        let err = match self.options.set_by_name(name, value) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if matches!(err, ConfigError::UnknownOption(_))
            && let Some(hook) = self.unknown_option_hook.as_mut()
            && hook(name, value)
        {
            log::debug!("option {name} claimed by the caller");
            return Ok(());
        }
        let option = err.option_name().unwrap_or_else(|| name.to_owned());
        let (code, args) = match &err {
            ConfigError::UnknownOption(_) => (MessageCode::UnknownOption, vec![option]),
            ConfigError::ReadOnly(_) => (MessageCode::ReadOnlyOption, vec![option]),
            other => (
                MessageCode::BadOptionValue,
                vec![option, value.to_owned(), other.to_string()],
            ),
        };
        let _ = self.log.report(code, pos, args);
        Err(err)
    }

    // ===== CALLBACKS =====

    /// Inspect every message as it is reported. Returning `false` mutes it:
    /// it is still recorded and counted, but not displayed.
    pub fn set_message_filter(&mut self, filter: impl FnMut(&Message) -> bool + Send + 'static) {
        self.log.set_filter(Box::new(filter));
    }

    /// Offer unknown option names to the caller before reporting them.
    pub fn set_unknown_option_hook(
        &mut self,
        hook: impl FnMut(&str, &str) -> bool + Send + 'static,
    ) {
        self.unknown_option_hook = Some(Box::new(hook));
    }

    /// Be told about every option change, including coupled ones.
    pub fn on_option_change(
        &mut self,
        callback: impl FnMut(OptionId, &OptionValue) + Send + 'static,
    ) {
        self.options.on_change(Box::new(callback));
    }

    /// Receive the line mapping while the document is saved.
    pub fn on_print_progress(
        &mut self,
        callback: impl FnMut(&PrettyPrintRecord) + Send + 'static,
    ) {
        self.progress = Some(Box::new(callback));
    }

    // ===== PARSING =====

    /// Parse markup that is already text.
    ///
    /// # Errors
    ///
    /// Never fails for in-memory text; the signature matches the other
    /// parse entry points.
    pub fn parse_str(&mut self, text: &str) -> Result<Status, DocumentError> {
        self.detected_encoding = None;
        Ok(self.parse_text(text, Vec::new()))
    }

    /// Decode and parse raw bytes.
    ///
    /// # Errors
    ///
    /// Never fails for in-memory bytes; undecodable sequences are replaced
    /// and reported as messages.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<Status, DocumentError> {
        let configured = self
            .input_encoding
            .unwrap_or_else(|| self.options.get_choice(OptionId::InputEncoding));
        log::debug!("decoding {} bytes as {configured}", bytes.len());
        let decoded = decode(bytes, configured);
        if decoded.encoding != configured {
            log::debug!("input read as {}", decoded.encoding);
        }
        self.detected_encoding = Some(decoded.encoding);
        Ok(self.parse_text(&decoded.text, decoded.messages))
    }

    /// Read and parse a file. Its name is used in `gnu-emacs` messages.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotFound`] or [`DocumentError::Read`].
    pub fn parse_file(&mut self, path: &Path) -> Result<Status, DocumentError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DocumentError::NotFound(path.to_path_buf())
            } else {
                DocumentError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let name = path.display().to_string();
        if let Err(err) = self.options.force(OptionId::EmacsFile, name.as_str()) {
            log::debug!("cannot record file name: {err}");
        }
        self.parse_bytes(&bytes)
    }

    /// Read everything from `reader` and parse it.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Input`] when reading fails.
    pub fn parse_reader(&mut self, mut reader: impl Read) -> Result<Status, DocumentError> {
        let mut bytes = Vec::new();
        let _ = reader
            .read_to_end(&mut bytes)
            .map_err(DocumentError::Input)?;
        self.parse_bytes(&bytes)
    }

    fn parse_text(&mut self, text: &str, lexer_messages: Vec<Message>) -> Status {
        let muted = self.muted_codes();
        self.log.set_muted(muted);
        for message in lexer_messages {
            self.log.push(message);
        }

        log::debug!("parsing {} characters", text.len());
        let builder_options = BuilderOptions::from_store(&self.options);
        let outcome = parse_document(text, builder_options, &mut self.log);

        let detected: &'static str = outcome.doctype.into();
        if let Err(err) = self
            .options
            .force(OptionId::DoctypeMode, OptionValue::Choice(detected))
        {
            log::debug!("cannot record doctype mode: {err}");
        }
        self.detected_doctype = outcome.doctype;
        self.halted = outcome.halted;
        self.body_was_implicit = outcome.body_was_implicit;
        self.body_only = false;
        self.records.clear();
        self.tree = Some(outcome.tree);
        self.status()
    }

    fn muted_codes(&self) -> Vec<MessageCode> {
        self.options
            .get_list(OptionId::Mute)
            .into_iter()
            .filter_map(|key| match MessageCode::from_str(key) {
                Ok(code) => Some(code),
                Err(_) => {
                    log::debug!("ignoring unknown message key in mute: {key}");
                    None
                }
            })
            .collect()
    }

    // ===== CLEANUP AND DIAGNOSTICS =====

    /// Apply the clean-up options to the parsed tree: doctype policy,
    /// `hide-comments`, empty element trimming and `show-body-only`.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotParsed`] before a successful parse.
    pub fn clean_and_repair(&mut self) -> Result<Status, DocumentError> {
        let tree = self.tree.as_mut().ok_or(DocumentError::NotParsed)?;

        if self.options.get_bool(OptionId::HideComments) {
            let removed = cleanup::hide_comments(tree);
            log::debug!("removed {removed} comment(s)");
        }
        if self.options.get_bool(OptionId::DropEmptyElements) {
            let drop_paras = self.options.get_bool(OptionId::DropEmptyParas);
            let removed = cleanup::trim_empty_elements(tree, &mut self.log, drop_paras);
            log::debug!("trimmed {removed} empty element(s)");
        }

        let choice: DoctypeChoice = self.options.get_choice(OptionId::Doctype);
        cleanup::apply_doctype(tree, choice);
        if self.options.get_bool(OptionId::OutputXhtml) {
            cleanup::add_xhtml_namespace(tree);
        }

        self.body_only = match self.options.get_choice(OptionId::ShowBodyOnly) {
            AutoBool::Yes => true,
            AutoBool::Auto => self.body_was_implicit,
            AutoBool::No => false,
        };
        log::debug!("clean-up done, body only: {}", self.body_only);
        Ok(self.status())
    }

    /// Report the doctype found and the HTML version the content looks like.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotParsed`] before a successful parse.
    pub fn run_diagnostics(&mut self) -> Result<Status, DocumentError> {
        let tree = self.tree.as_ref().ok_or(DocumentError::NotParsed)?;
        if self.detected_doctype != DetectedDoctype::Omitted
            && let Some(given) = doctype_given(tree)
        {
            let _ = self.log.report(MessageCode::DoctypeGiven, None, vec![given]);
        }
        let version = content_version(tree, self.detected_doctype);
        let _ = self
            .log
            .report(MessageCode::ContentLooksLike, None, vec![version.to_string()]);
        Ok(self.status())
    }

    // ===== OUTPUT =====

    /// True when saving would write nothing: `markup` is off, or there are
    /// errors and `force-output` is off.
    #[must_use]
    pub fn output_suppressed(&self) -> bool {
        !self.options.get_bool(OptionId::Markup)
            || (self.error_count() > 0 && !self.options.get_bool(OptionId::ForceOutput))
    }

    /// The formatted document as text, or `None` when output is suppressed.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotParsed`] before a successful parse.
    pub fn save_to_string(&mut self) -> Result<Option<String>, DocumentError> {
        if self.output_suppressed() {
            return Ok(None);
        }
        Ok(Some(self.render()?.text))
    }

    /// The formatted document encoded per `output-encoding` and `newline`,
    /// or `None` when output is suppressed.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotParsed`] before a successful parse.
    pub fn save_to_bytes(&mut self) -> Result<Option<Vec<u8>>, DocumentError> {
        if self.output_suppressed() {
            return Ok(None);
        }
        let text = self.render()?.text;
        Ok(Some(OutputSink::from_store(&self.options).encode(&text)))
    }

    /// Write the formatted document. Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Print`] when the writer fails.
    pub fn save_to_writer<W: Write>(&mut self, out: &mut W) -> Result<bool, DocumentError> {
        if self.output_suppressed() {
            return Ok(false);
        }
        let text = self.render()?.text;
        OutputSink::from_store(&self.options).write(&text, out)?;
        Ok(true)
    }

    /// Write the formatted document to `path`. Returns whether anything was
    /// written; a suppressed save leaves the file untouched.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Write`] when the file cannot be written.
    pub fn save_file(&mut self, path: &Path) -> Result<bool, DocumentError> {
        let Some(bytes) = self.save_to_bytes()? else {
            return Ok(false);
        };
        std::fs::write(path, bytes).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(true)
    }

    fn render(&mut self) -> Result<PrintedDocument, DocumentError> {
        let tree = self.tree.as_ref().ok_or(DocumentError::NotParsed)?;
        let options = PrintOptions::from_store(&self.options);
        let mut printer = PrettyPrinter::new(tree, options);
        if let Some(progress) = self.progress.as_mut() {
            printer = printer.on_progress(|record| progress(record));
        }
        let body = tree.body().filter(|_| self.body_only);
        let printed = match body {
            Some(body) => printer.print_contents(body),
            None => printer.print(kempt_dom::NodeId::ROOT),
        };
        log::debug!(
            "printed {} line(s), {} record(s)",
            printed.text.lines().count(),
            printed.records.len()
        );
        self.records.clone_from(&printed.records);
        Ok(printed)
    }

    /// The line mapping from the last save.
    #[must_use]
    pub fn pretty_print_records(&self) -> &[PrettyPrintRecord] {
        &self.records
    }

    // ===== STATUS AND MESSAGES =====

    /// Clean, warnings or errors, from the messages so far.
    #[must_use]
    pub const fn status(&self) -> Status {
        Status::from_counts(self.log.error_count(), self.log.warning_count())
    }

    /// Number of error messages.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.log.error_count()
    }

    /// Number of warning messages.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.log.warning_count()
    }

    /// Number of informational messages.
    #[must_use]
    pub const fn info_count(&self) -> usize {
        self.log.info_count()
    }

    /// Number of configuration problems.
    #[must_use]
    pub const fn config_error_count(&self) -> usize {
        self.log.config_error_count()
    }

    /// Every message, in the order it was reported.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// The doctype the parser found.
    #[must_use]
    pub const fn detected_doctype(&self) -> DetectedDoctype {
        self.detected_doctype
    }

    /// The encoding the last byte input was decoded with. `None` after
    /// parsing text.
    #[must_use]
    pub const fn detected_encoding(&self) -> Option<Encoding> {
        self.detected_encoding
    }

    /// True if parsing stopped at `error-limit`.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// True if saving prints only the content of `<body>`.
    #[must_use]
    pub const fn body_only(&self) -> bool {
        self.body_only
    }

    /// Write the messages a user should see, following `show-warnings`,
    /// `show-info`, `show-errors`, `mute`, `mute-id` and `gnu-emacs`.
    ///
    /// # Errors
    ///
    /// Any error from `out`.
    pub fn report_messages<W: Write + ?Sized>(&self, out: &mut W, color: bool) -> io::Result<()> {
        let show_warnings = self.options.get_bool(OptionId::ShowWarnings);
        let show_info = self.options.get_bool(OptionId::ShowInfo);
        let error_limit = usize::try_from(self.options.get_int(OptionId::ShowErrors))
            .unwrap_or(usize::MAX);
        let show_key = self.options.get_bool(OptionId::MuteId);
        let emacs_file = self
            .options
            .get_bool(OptionId::GnuEmacs)
            .then(|| self.options.get_str(OptionId::EmacsFile))
            .map(|name| if name.is_empty() { "stdin" } else { name });

        let mut errors_shown = 0;
        for message in self.log.messages().iter().filter(|m| !m.muted) {
            let shown = match message.severity {
                _ if message.code.is_config() => true,
                Severity::Error => {
                    errors_shown += 1;
                    errors_shown <= error_limit
                }
                Severity::Warning => show_warnings,
                Severity::Info => show_info,
            };
            if shown {
                write_message(out, message, emacs_file, color, show_key)?;
            }
        }
        Ok(())
    }

    /// A one-paragraph summary of the counts, in the style
    /// `"2 warnings, 1 error were found!"`.
    #[must_use]
    pub fn error_summary(&self) -> String {
        let (warnings, errors) = (self.warning_count(), self.error_count());
        if warnings == 0 && errors == 0 {
            return "No warnings or errors were found.".to_owned();
        }
        let mut summary = format!(
            "{warnings} {}, {errors} {} were found!",
            plural(warnings, "warning"),
            plural(errors, "error")
        );
        if self.halted {
            summary.push_str(" Parsing stopped at the error limit.");
        }
        if errors > 0 && !self.options.get_bool(OptionId::ForceOutput) {
            summary.push_str(
                " This document has errors that must be fixed before kempt can write it.",
            );
        }
        summary
    }

    // ===== APPLICATION DATA =====

    /// Attach a value of the caller's choosing, replacing any previous one.
    pub fn set_app_data<T: Any + Send>(&mut self, data: T) {
        self.app_data = Some(Box::new(data));
    }

    /// The attached value, if there is one of type `T`.
    #[must_use]
    pub fn app_data<T: Any>(&self) -> Option<&T> {
        self.app_data.as_ref()?.downcast_ref()
    }

    /// Detach and return the attached value, if there is one of type `T`.
    pub fn take_app_data<T: Any>(&mut self) -> Option<T> {
        let data = self.app_data.take()?;
        match data.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.app_data = Some(other);
                None
            }
        }
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_owned()
    } else {
        format!("{word}s")
    }
}
