//! The option table.

use std::fmt;

use strum::VariantNames;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::values::{
    AttributeSort, AutoBool, BadCharRefs, DetectedDoctype, DoctypeChoice, Encoding, Newline,
};

/// Every option the store knows.
///
/// The kebab-case string form (`indent-spaces`, `new-blocklevel-tags`) is the
/// name used in configuration files and on the command line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum OptionId {
    // Markup
    NewBlocklevelTags,
    NewInlineTags,
    NewEmptyTags,
    NewPreTags,
    EncloseText,
    DropEmptyParas,
    DropEmptyElements,
    HideComments,
    Doctype,
    BadCharRefs,
    ErrorLimit,
    ShowBodyOnly,
    Markup,

    // Pretty printing
    Indent,
    IndentSpaces,
    IndentWithTabs,
    TabSize,
    Wrap,
    SortAttributes,
    UppercaseTags,
    UppercaseAttributes,
    QuoteMarks,
    QuoteAmpersand,
    QuoteNbsp,
    NumericEntities,
    OutputXhtml,
    OutputHtml,
    Newline,
    OutputFile,

    // Encoding
    CharEncoding,
    InputEncoding,
    OutputEncoding,

    // Diagnostics
    ShowWarnings,
    ShowInfo,
    ShowErrors,
    Mute,
    MuteId,
    GnuEmacs,
    Quiet,
    ForceOutput,
    ErrorFile,
    DoctypeMode,

    // Internal
    EmacsFile,
}

/// Which part of the pipeline an option affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum OptionCategory {
    /// How markup is parsed and repaired.
    Markup,
    /// How output is laid out.
    PrettyPrint,
    /// Input and output character encodings.
    Encoding,
    /// What is reported and how.
    Diagnostics,
    /// Used by the library itself; never listed or settable by name.
    Internal,
}

/// The declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OptionType {
    /// Free text, or a canonicalized list of names.
    String,
    /// A non-negative integer within a range.
    Integer,
    /// `yes` or `no`.
    Boolean,
    /// One label from a closed list.
    Picklist,
}

/// How values of an option are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Any string.
    String,
    /// A list of names, stored as `"a, b, c"`.
    List,
    /// An integer in `min..=max`.
    Integer {
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },
    /// `yes` or `no`.
    Boolean,
    /// One of the listed labels.
    Picklist(&'static [&'static str]),
}

impl OptionKind {
    /// The declared type this kind validates.
    #[must_use]
    pub const fn option_type(self) -> OptionType {
        match self {
            Self::String | Self::List => OptionType::String,
            Self::Integer { .. } => OptionType::Integer,
            Self::Boolean => OptionType::Boolean,
            Self::Picklist(_) => OptionType::Picklist,
        }
    }
}

/// A value held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    /// For string and list options.
    Str(String),
    /// For integer options.
    Int(u64),
    /// For boolean options.
    Bool(bool),
    /// For picklist options: the canonical label.
    Choice(&'static str),
}

impl OptionValue {
    /// The type of option this value can be stored in.
    #[must_use]
    pub const fn option_type(&self) -> OptionType {
        match self {
            Self::Str(_) => OptionType::String,
            Self::Int(_) => OptionType::Integer,
            Self::Bool(_) => OptionType::Boolean,
            Self::Choice(_) => OptionType::Picklist,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(true) => f.write_str("yes"),
            Self::Bool(false) => f.write_str("no"),
            Self::Choice(label) => f.write_str(label),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

/// Static description of one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    /// The option described.
    pub id: OptionId,
    /// Where it belongs.
    pub category: OptionCategory,
    /// How its values are validated.
    pub kind: OptionKind,
    /// The value every new store starts with.
    pub default: OptionValue,
    /// Only the library may change it.
    pub read_only: bool,
    /// One-line description for `--show-config`.
    pub doc: &'static str,
}

impl OptionDef {
    /// The declared type.
    #[must_use]
    pub const fn option_type(&self) -> OptionType {
        self.kind.option_type()
    }

    /// The picklist labels, if this is a picklist option.
    #[must_use]
    pub const fn picklist(&self) -> Option<&'static [&'static str]> {
        match self.kind {
            OptionKind::Picklist(labels) => Some(labels),
            _ => None,
        }
    }
}

const fn boolean(
    id: OptionId,
    category: OptionCategory,
    default: bool,
    doc: &'static str,
) -> OptionDef {
    OptionDef {
        id,
        category,
        kind: OptionKind::Boolean,
        default: OptionValue::Bool(default),
        read_only: false,
        doc,
    }
}

const fn integer(
    id: OptionId,
    category: OptionCategory,
    (min, max): (u64, u64),
    default: u64,
    doc: &'static str,
) -> OptionDef {
    OptionDef {
        id,
        category,
        kind: OptionKind::Integer { min, max },
        default: OptionValue::Int(default),
        read_only: false,
        doc,
    }
}

const fn string(id: OptionId, category: OptionCategory, doc: &'static str) -> OptionDef {
    OptionDef {
        id,
        category,
        kind: OptionKind::String,
        default: OptionValue::Str(String::new()),
        read_only: false,
        doc,
    }
}

const fn list(id: OptionId, category: OptionCategory, doc: &'static str) -> OptionDef {
    OptionDef {
        id,
        category,
        kind: OptionKind::List,
        default: OptionValue::Str(String::new()),
        read_only: false,
        doc,
    }
}

fn picklist<T: VariantNames + Into<&'static str>>(
    id: OptionId,
    category: OptionCategory,
    default: T,
    doc: &'static str,
) -> OptionDef {
    OptionDef {
        id,
        category,
        kind: OptionKind::Picklist(T::VARIANTS),
        default: OptionValue::Choice(default.into()),
        read_only: false,
        doc,
    }
}

impl OptionId {
    /// The canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Position in the store's value table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for options that are never surfaced to callers.
    #[must_use]
    pub fn is_internal(self) -> bool {
        self.def().category == OptionCategory::Internal
    }

    /// The static description of this option.
    #[must_use]
    pub fn def(self) -> OptionDef {
        use OptionCategory::{Diagnostics, Encoding as Enc, Internal, Markup, PrettyPrint};
        match self {
            Self::NewBlocklevelTags => list(self, Markup, "custom block-level tags"),
            Self::NewInlineTags => list(self, Markup, "custom inline tags"),
            Self::NewEmptyTags => list(self, Markup, "custom void tags"),
            Self::NewPreTags => list(self, Markup, "custom preformatted tags"),
            Self::EncloseText => boolean(self, Markup, false, "wrap bare body text in <p>"),
            Self::DropEmptyParas => boolean(self, Markup, true, "remove empty <p> elements"),
            Self::DropEmptyElements => {
                boolean(self, Markup, true, "remove empty inline elements")
            }
            Self::HideComments => boolean(self, Markup, false, "drop comments from output"),
            Self::Doctype => picklist(self, Markup, DoctypeChoice::Auto, "doctype to output"),
            Self::BadCharRefs => picklist(
                self,
                Markup,
                BadCharRefs::Replace,
                "replace or drop illegal numeric references",
            ),
            Self::ErrorLimit => integer(
                self,
                Markup,
                (0, 1_000_000),
                0,
                "stop parsing after this many errors (0 = no limit)",
            ),
            Self::ShowBodyOnly => picklist(
                self,
                Markup,
                AutoBool::No,
                "print only the content of <body>",
            ),
            Self::Markup => boolean(self, Markup, true, "write the formatted markup"),

            Self::Indent => picklist(self, PrettyPrint, AutoBool::No, "indent block content"),
            Self::IndentSpaces => {
                integer(self, PrettyPrint, (0, 20), 2, "spaces per indent level")
            }
            Self::IndentWithTabs => {
                boolean(self, PrettyPrint, false, "indent with tabs instead of spaces")
            }
            Self::TabSize => integer(self, PrettyPrint, (1, 16), 8, "columns per tab"),
            Self::Wrap => integer(
                self,
                PrettyPrint,
                (0, 10_000),
                68,
                "wrap lines at this column (0 = no wrapping)",
            ),
            Self::SortAttributes => picklist(
                self,
                PrettyPrint,
                AttributeSort::Unsorted,
                "attribute order in output",
            ),
            Self::UppercaseTags => boolean(self, PrettyPrint, false, "print tag names in upper case"),
            Self::UppercaseAttributes => {
                boolean(self, PrettyPrint, false, "print attribute names in upper case")
            }
            Self::QuoteMarks => boolean(self, PrettyPrint, false, "write \" in text as &quot;"),
            Self::QuoteAmpersand => boolean(self, PrettyPrint, true, "write & in text as &amp;"),
            Self::QuoteNbsp => boolean(self, PrettyPrint, true, "write U+00A0 as &nbsp;"),
            Self::NumericEntities => {
                boolean(self, PrettyPrint, false, "use numeric rather than named references")
            }
            Self::OutputXhtml => boolean(self, PrettyPrint, false, "write XHTML"),
            Self::OutputHtml => boolean(self, PrettyPrint, false, "write HTML"),
            Self::Newline => picklist(self, PrettyPrint, Newline::Lf, "line ending in output"),
            Self::OutputFile => string(self, PrettyPrint, "write output to this file"),

            Self::CharEncoding => {
                picklist(self, Enc, Encoding::Utf8, "input and output encoding")
            }
            Self::InputEncoding => picklist(self, Enc, Encoding::Utf8, "input encoding"),
            Self::OutputEncoding => picklist(self, Enc, Encoding::Utf8, "output encoding"),

            Self::ShowWarnings => boolean(self, Diagnostics, true, "show warnings"),
            Self::ShowInfo => boolean(self, Diagnostics, true, "show informational messages"),
            Self::ShowErrors => integer(
                self,
                Diagnostics,
                (0, 1_000_000),
                6,
                "show at most this many errors",
            ),
            Self::Mute => list(self, Diagnostics, "message keys to hide"),
            Self::MuteId => boolean(self, Diagnostics, false, "append message keys to output"),
            Self::GnuEmacs => boolean(self, Diagnostics, false, "file:line:column: message format"),
            Self::Quiet => boolean(self, Diagnostics, false, "no summary or banner"),
            Self::ForceOutput => {
                boolean(self, Diagnostics, false, "write output even when errors were found")
            }
            Self::ErrorFile => string(self, Diagnostics, "write messages to this file"),
            Self::DoctypeMode => OptionDef {
                read_only: true,
                ..picklist(
                    self,
                    Diagnostics,
                    DetectedDoctype::Omitted,
                    "doctype found by the parser",
                )
            },

            Self::EmacsFile => string(self, Internal, "file name for gnu-emacs messages"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn names_are_kebab_case() {
        assert_eq!(OptionId::NewBlocklevelTags.name(), "new-blocklevel-tags");
        assert_eq!(OptionId::IndentWithTabs.to_string(), "indent-with-tabs");
    }

    #[test]
    fn defaults_match_their_kind() {
        for id in OptionId::iter() {
            let def = id.def();
            assert_eq!(def.id, id);
            assert_eq!(def.default.option_type(), def.option_type(), "{id}");
            if let (OptionKind::Integer { min, max }, OptionValue::Int(n)) = (def.kind, &def.default)
            {
                assert!((min..=max).contains(n), "{id}");
            }
            if let (Some(labels), OptionValue::Choice(label)) = (def.picklist(), &def.default) {
                assert!(labels.contains(label), "{id}");
            }
        }
    }

    #[test]
    fn only_emacs_file_is_internal() {
        let internal: Vec<OptionId> = OptionId::iter().filter(|id| id.is_internal()).collect();
        assert_eq!(internal, vec![OptionId::EmacsFile]);
    }
}
