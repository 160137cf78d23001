//! Diagnostic messages.
//!
//! Every recoverable defect found while lexing, repairing, cleaning or
//! configuring a document becomes a [`Message`]. Messages are identified by a
//! [`MessageCode`] whose stable string key (e.g. `MISSING_ENDTAG_BEFORE`) is
//! what callers match on and what the `mute` option lists.

use std::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::position::SourcePos;

/// How serious a message is.
///
/// The ordering is meaningful: `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
pub enum Severity {
    /// Informational; never affects the document status.
    Info,
    /// A defect that was repaired.
    Warning,
    /// A defect that could not be repaired faithfully.
    Error,
}

/// Stable identifier for every message kind.
///
/// The string form of each variant (via [`MessageCode::key`]) is part of the
/// public interface and must not change.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageCode {
    // Lexer
    /// A recoverable lexical defect; the argument names it.
    MalformedMarkup,
    /// `--` inside a comment, or a `-- >` style comment close.
    MalformedComment,
    /// End of input inside a comment.
    UnterminatedComment,
    /// A doctype that could not be read completely.
    MalformedDoctype,
    /// A repeated attribute on one tag; the later value is dropped.
    DuplicateAttribute,
    /// Attributes on an end tag.
    EndTagWithAttributes,
    /// A named or numeric reference without its closing `;`.
    MissingSemicolon,
    /// `&` followed by a name that is not a known entity.
    UnknownEntity,
    /// A numeric reference to a code point that is not a legal character.
    InvalidCharRef,
    /// A numeric reference in the C1 range, remapped through Windows-1252.
    VendorSpecificChars,
    /// Bytes that are not valid in the input encoding.
    InvalidByteSequence,
    /// The declared encoding disagrees with the detected one.
    EncodingMismatch,

    // Tree builder
    /// An element closed implicitly because something else started or ended.
    MissingEndtagBefore,
    /// An element still open at end of input whose end tag is required.
    MissingEndtagFor,
    /// A tag that fits nowhere and was dropped.
    DiscardingUnexpected,
    /// An end tag replaced by the one that was actually needed.
    ReplacingUnexpected,
    /// A structural element synthesized by the builder.
    InsertingTag,
    /// A list item or definition term outside its list; a list was inserted.
    MissingParent,
    /// An element moved because it may not appear where it was found.
    TagNotAllowedIn,
    /// Text moved because its container may not hold text.
    TextNotAllowedIn,
    /// A tag name that is neither built in nor declared.
    UnknownElement,
    /// No doctype at the start of the document.
    MissingDoctype,
    /// No `title` in `head`; an empty one was inserted.
    MissingTitleElement,
    /// `<x/>` on an element that is not void.
    SelfClosingNonVoid,
    /// The configured error limit was reached and parsing stopped.
    ErrorLimitReached,

    // Cleanup and diagnostics
    /// An empty element removed during cleanup.
    TrimEmptyElement,
    /// Reports the doctype found in the document.
    DoctypeGiven,
    /// Reports which HTML version the content resembles.
    ContentLooksLike,

    // Configuration
    /// An option name that nothing recognized.
    UnknownOption,
    /// A value the named option cannot take.
    BadOptionValue,
    /// An attempt to set a read-only option.
    ReadOnlyOption,
}

impl MessageCode {
    /// The stable string key, e.g. `"MISSING_ENDTAG_BEFORE"`.
    #[must_use]
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// The severity every message with this code carries.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::InsertingTag
            | Self::ErrorLimitReached
            | Self::DoctypeGiven
            | Self::ContentLooksLike => Severity::Info,
            Self::UnknownElement => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// True for configuration problems, which are counted apart from markup
    /// defects and never change the document status.
    #[must_use]
    pub const fn is_config(self) -> bool {
        matches!(
            self,
            Self::UnknownOption | Self::BadOptionValue | Self::ReadOnlyOption
        )
    }

    /// The default English template. `{0}`, `{1}`, ... are replaced by the
    /// message arguments in order.
    #[must_use]
    pub const fn default_format(self) -> &'static str {
        match self {
            Self::MalformedMarkup => "malformed markup: {0}",
            Self::MalformedComment => "adjacent hyphens within comment",
            Self::UnterminatedComment => "unterminated comment, truncated after \"{0}\"",
            Self::MalformedDoctype => "malformed <!DOCTYPE>",
            Self::DuplicateAttribute => "<{0}> dropping value \"{2}\" for repeated attribute \"{1}\"",
            Self::EndTagWithAttributes => "</{0}> end tag has attributes",
            Self::MissingSemicolon => "entity \"{0}\" doesn't end in ';'",
            Self::UnknownEntity => "unescaped & or unknown entity \"{0}\"",
            Self::InvalidCharRef => "invalid character reference {0} {1}",
            Self::VendorSpecificChars => "character code {0} is vendor specific, mapped to {1}",
            Self::InvalidByteSequence => "{0} invalid byte sequence(s) in {1} input",
            Self::EncodingMismatch => {
                "specified input encoding ({0}) does not match actual input encoding ({1})"
            }
            Self::MissingEndtagBefore => "missing </{0}> before {1}",
            Self::MissingEndtagFor => "missing </{0}>",
            Self::DiscardingUnexpected => "discarding unexpected {0}",
            Self::ReplacingUnexpected => "replacing unexpected {0} with </{1}>",
            Self::InsertingTag => "inserting implicit <{0}>",
            Self::MissingParent => "<{1}> is not inside <{0}>, inserting implicit <{0}>",
            Self::TagNotAllowedIn => "<{0}> isn't allowed in <{1}> elements",
            Self::TextNotAllowedIn => "plain text isn't allowed in <{0}> elements",
            Self::UnknownElement => "<{0}> is not recognized!",
            Self::MissingDoctype => "missing <!DOCTYPE> declaration",
            Self::MissingTitleElement => "inserting missing 'title' element",
            Self::SelfClosingNonVoid => "<{0}/> is not a void element, treating it as <{0}></{0}>",
            Self::ErrorLimitReached => "error limit of {0} reached, stopping further parsing",
            Self::TrimEmptyElement => "trimming empty <{0}>",
            Self::DoctypeGiven => "Doctype given is \"{0}\"",
            Self::ContentLooksLike => "Document content looks like {0}",
            Self::UnknownOption => "unknown option: {0}",
            Self::BadOptionValue => "bad argument \"{1}\" for option \"{0}\": {2}",
            Self::ReadOnlyOption => "option \"{0}\" is read-only",
        }
    }
}

/// One diagnostic, as recorded in a document's message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// What kind of message this is.
    pub code: MessageCode,
    /// Copied from [`MessageCode::severity`] when the message is created.
    pub severity: Severity,
    /// Where in the source the defect was found. `None` for document-level
    /// findings such as a missing doctype.
    pub pos: Option<SourcePos>,
    /// Values substituted into the format template.
    pub args: Vec<String>,
    /// Suppressed from display by configuration or by the caller's filter.
    /// Muted messages are still recorded and still counted.
    pub muted: bool,
}

impl Message {
    /// Create an unmuted message for `code`.
    #[must_use]
    pub fn new(code: MessageCode, pos: Option<SourcePos>, args: Vec<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            pos,
            args,
            muted: false,
        }
    }

    /// The stable string key of the message code.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.code.key()
    }

    /// The format template with arguments substituted.
    #[must_use]
    pub fn text(&self) -> String {
        format_args_into(self.code.default_format(), &self.args)
    }

    /// Render the message the way it is shown to users:
    /// `line 3 column 5 - Warning: missing </p> before <div>`.
    ///
    /// With `emacs_file` set the GNU style prefix is used instead:
    /// `page.html:3:5: Warning: missing </p> before <div>`.
    #[must_use]
    pub fn render(&self, emacs_file: Option<&str>) -> String {
        match (emacs_file, self.pos) {
            (Some(file), Some(pos)) => {
                format!("{file}:{}:{}: {}: {}", pos.line, pos.column, self.severity, self.text())
            }
            (Some(file), None) => format!("{file}: {}: {}", self.severity, self.text()),
            (None, Some(pos)) => format!("{pos} - {}: {}", self.severity, self.text()),
            (None, None) => format!("{}: {}", self.severity, self.text()),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

/// Substitute `{N}` placeholders. Placeholders without a matching argument
/// are left as written.
fn format_args_into(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let index = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|n| (n, close)));
        match index {
            Some((n, close)) if n < args.len() => {
                out.push_str(&args[n]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
