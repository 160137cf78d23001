//! Source to output line mapping.

use serde::Serialize;

/// Where an output line's first content came from.
///
/// One record is produced for each output line whose first content
/// originates from a different source line than the line it is printed on.
/// Lines 1-based, like [`kempt_common::SourcePos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrettyPrintRecord {
    /// Line in the parsed input.
    pub source_line: usize,
    /// Column in the parsed input.
    pub source_column: usize,
    /// Line in the printed output.
    pub dest_line: usize,
}
