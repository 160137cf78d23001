//! Picklist value types.
//!
//! Each picklist option stores the canonical label of one of these enums. The
//! labels come from strum, so the enum is the single source of truth for both
//! validation and typed access.

use strum_macros::{Display, EnumString, IntoStaticStr, VariantNames};

/// `no`, `yes` or `auto`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AutoBool {
    /// Off.
    #[default]
    No,
    /// On.
    Yes,
    /// Decided per document or per element.
    Auto,
}

/// Attribute ordering in output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttributeSort {
    /// Source order.
    #[default]
    #[strum(serialize = "none")]
    Unsorted,
    /// Alphabetical by name.
    Alpha,
}

/// Line ending written to output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Newline {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
    /// `\r`
    Cr,
}

impl Newline {
    /// The characters written for one line break.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

/// Character encodings accepted for input and output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Encoding {
    /// Bytes are taken as Latin-1 code points and written back unchanged.
    Raw,
    /// 7-bit ASCII; everything else is written as a character reference.
    Ascii,
    /// ISO-8859-1.
    Latin1,
    /// UTF-8.
    #[default]
    Utf8,
    /// Windows-1252.
    Win1252,
    /// UTF-16, little endian.
    Utf16le,
    /// UTF-16, big endian.
    Utf16be,
    /// Mac OS Roman.
    Mac,
    /// Shift_JIS.
    Shiftjis,
    /// Big5.
    Big5,
}

/// What to do with the document's doctype.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DoctypeChoice {
    /// Keep the doctype found; insert `<!DOCTYPE html>` if there is none.
    #[default]
    Auto,
    /// Remove any doctype.
    Omit,
    /// Force `<!DOCTYPE html>`.
    Html5,
    /// Force the HTML 4.01 Strict doctype.
    Strict,
    /// Force the HTML 4.01 Transitional doctype.
    Loose,
    /// Same as `loose`.
    Transitional,
}

/// The doctype the parser found. Reported through the read-only
/// `doctype-mode` option.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DetectedDoctype {
    /// No doctype in the source.
    #[default]
    Omitted,
    /// `<!DOCTYPE html>`
    Html5,
    /// HTML 4.01 Strict.
    Html4Strict,
    /// HTML 4.01 Transitional.
    Html4Transitional,
    /// HTML 4.01 Frameset.
    Html4Frameset,
    /// Any XHTML 1.x doctype.
    Xhtml1,
    /// Anything else.
    Other,
}

/// What to do with numeric references to illegal code points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BadCharRefs {
    /// Substitute U+FFFD.
    #[default]
    Replace,
    /// Remove the reference.
    #[strum(serialize = "drop")]
    Discard,
}
