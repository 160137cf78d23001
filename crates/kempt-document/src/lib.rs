//! The kempt document session.
//!
//! A [`Document`] ties the pieces together: it owns the option store and
//! message log, runs the lexer and tree builder, applies clean-up passes,
//! reports diagnostics and hands the tree to the pretty printer.
//!
//! ```no_run
//! use kempt_document::Document;
//!
//! let mut doc = Document::new();
//! doc.set_option("indent", "auto")?;
//! let status = doc.parse_str("<h1>Hello, world!</h2>")?;
//! doc.clean_and_repair()?;
//! doc.run_diagnostics()?;
//! if let Some(text) = doc.save_to_string()? {
//!     print!("{text}");
//! }
//! assert_eq!(status.code(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cleanup;
pub mod diagnostics;
mod document;
pub mod error;
mod query;
pub mod status;

pub use diagnostics::ContentVersion;
pub use document::{Document, ProgressHook, UnknownOptionHook};
pub use error::DocumentError;
pub use status::Status;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Document>();
    }
}
