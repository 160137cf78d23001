//! HTML tree construction with repair.
//!
//! Implements [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//! as a tolerant, reporting tree builder: every token is placed somewhere
//! sensible, and each correction becomes a [`kempt_common::Message`].

/// Tree builder state, insertion modes before and after body, end of input.
pub mod core;
/// The "in body" rules, including table and list repair.
mod in_body;

pub use self::core::{
    BuilderOptions, InsertionMode, ParseOutcome, TreeBuilder, detect_doctype, dump_tree,
};

use kempt_common::MessageLog;

/// Build and repair a tree for `input` in one call.
#[must_use]
pub fn parse_document(input: &str, options: BuilderOptions, log: &mut MessageLog) -> ParseOutcome {
    let mut builder = TreeBuilder::new(input, options, log);
    builder.run();
    builder.into_outcome()
}
