//! Pretty printer for kempt document trees.
//!
//! # Scope
//!
//! - Block elements on their own lines, flowed inline content, indentation
//!   per the `indent` option
//! - Line wrapping at whitespace only
//! - Verbatim raw text (`script`, `style`) and preformatted content
//! - Attribute sorting, case folding and escaping
//! - XHTML style void elements
//! - Source to output line mapping ([`PrettyPrintRecord`])
//! - Output sinks applying newline style and output encoding
//!
//! # Not Implemented
//!
//! - Column-exact wrapping of attribute values (values are never split)
//! - Re-indenting comment bodies

mod escape;
mod layout;
pub mod options;
pub mod printer;
pub mod record;
pub mod sink;

pub use options::PrintOptions;
pub use printer::{PrettyPrinter, PrintedDocument};
pub use record::PrettyPrintRecord;
pub use sink::{OutputSink, PrintError};
