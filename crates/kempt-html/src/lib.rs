//! HTML lexing and tree repair for kempt.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input decoding**: byte order marks, the `input-encoding` option and
//!   line break normalization
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, script data and PLAINTEXT states
//!   - DOCTYPE, comment, CDATA, processing instruction and XML declaration handling
//!   - Named and numeric character references, with `bad-char-refs` policy
//!   - Duplicate attribute removal
//!
//! - **Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes: Initial, BeforeHtml, BeforeHead, InHead, AfterHead, InBody, Text, AfterBody, AfterAfterBody
//!   - Implicit `html`, `head`, `body`, `title`, list and table structure
//!   - Foster parenting of misplaced table content
//!   - Error limit
//!
//! # Not Implemented
//!
//! - Adoption agency algorithm: misnested formatting elements are closed,
//!   not reopened
//! - Foreign content (SVG and MathML are treated as inline elements)

/// Input decoding and line break normalization.
pub mod encoding;
/// HTML tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{
    BuilderOptions, InsertionMode, ParseOutcome, TreeBuilder, dump_tree, parse_document,
};
pub use tokenizer::{Attribute, HtmlTokenizer, LocatedToken, Token, TokenizerOptions};
