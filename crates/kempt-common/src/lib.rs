//! Common infrastructure for the kempt HTML normalizer.
//!
//! This crate provides the pieces every pipeline stage shares:
//! - **Source positions** - 1-based line/column pairs attached to tokens and nodes
//! - **Messages** - the diagnostic record produced by lexing, repair and cleanup
//! - **Message log** - the append-only list a document accumulates, with counts,
//!   muting and a caller-supplied filter
//! - **Warning system** - colored terminal output for messages and notices

pub mod message;
pub mod position;
pub mod report;
pub mod warning;

pub use message::{Message, MessageCode, Severity};
pub use position::SourcePos;
pub use report::{MessageFilter, MessageLog};
