//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard, extended with the recovery rules and
//! diagnostics a markup cleaner needs.

/// Character reference states per § 13.2.5.72 - § 13.2.5.80.
pub mod character_reference;
/// HTML tokenizer state machine implementation.
pub mod core;
/// Comment, DOCTYPE, CDATA and processing instruction states.
pub mod declarations;
/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{HtmlTokenizer, TokenizerOptions, TokenizerState};
pub use token::{Attribute, LocatedToken, Token};
