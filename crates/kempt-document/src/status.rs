//! Overall outcome of processing a document.

use strum_macros::{Display, IntoStaticStr};

/// The worst thing that happened to a document.
///
/// Informational and configuration messages never change the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// No warnings or errors.
    Clean,
    /// Warnings, but no errors.
    Warnings,
    /// At least one error.
    Errors,
}

impl Status {
    /// The status for the given message counts.
    #[must_use]
    pub const fn from_counts(errors: usize, warnings: usize) -> Self {
        if errors > 0 {
            Self::Errors
        } else if warnings > 0 {
            Self::Warnings
        } else {
            Self::Clean
        }
    }

    /// The process exit code: 0, 1 or 2.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Warnings => 1,
            Self::Errors => 2,
        }
    }
}
