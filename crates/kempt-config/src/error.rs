//! Errors raised by the option store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::options::{OptionId, OptionType};

/// Why an option update or a config file load failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No public option has this name.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// The value's type does not match the option's declared type.
    #[error("option \"{option}\" expects a {expected} value")]
    TypeMismatch {
        /// The option being set.
        option: OptionId,
        /// Its declared type.
        expected: OptionType,
    },

    /// The option can only be changed by the library.
    #[error("option \"{0}\" is read-only")]
    ReadOnly(OptionId),

    /// An integer outside the option's range.
    #[error("value {value} for option \"{option}\" is outside {min}..={max}")]
    OutOfRange {
        /// The option being set.
        option: OptionId,
        /// The rejected value, which may be negative when parsed from text.
        value: i128,
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },

    /// A label that is not one of the option's choices.
    #[error("\"{value}\" is not a valid value for option \"{option}\" (expected one of: {allowed})")]
    NotInPicklist {
        /// The option being set.
        option: OptionId,
        /// The rejected label.
        value: String,
        /// The accepted labels, comma separated.
        allowed: String,
    },

    /// A config file could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    /// The name of the option involved, if any.
    #[must_use]
    pub fn option_name(&self) -> Option<String> {
        match self {
            Self::UnknownOption(name) => Some(name.clone()),
            Self::TypeMismatch { option, .. }
            | Self::ReadOnly(option)
            | Self::OutOfRange { option, .. }
            | Self::NotInPicklist { option, .. } => Some(option.name().to_owned()),
            Self::Io { .. } => None,
        }
    }
}
