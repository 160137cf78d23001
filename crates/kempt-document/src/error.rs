//! Errors that abort a document operation.
//!
//! Markup defects and bad option values never show up here; they are
//! recorded as messages. These are the failures the caller has to act on.

use std::io;
use std::path::PathBuf;

use kempt_config::ConfigError;
use kempt_print::PrintError;
use thiserror::Error;

/// A fatal failure while loading, parsing or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Reading from a stream failed.
    #[error("cannot read input: {0}")]
    Input(#[source] io::Error),

    /// A character encoding name kempt does not support.
    #[error("unsupported character encoding: {0}")]
    UnsupportedEncoding(String),

    /// The output file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A config file could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing formatted output failed.
    #[error(transparent)]
    Print(#[from] PrintError),

    /// An operation that needs a parsed document was called before parsing.
    #[error("no document has been parsed")]
    NotParsed,
}
