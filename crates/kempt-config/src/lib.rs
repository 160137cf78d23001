//! Option store for the kempt HTML normalizer.
//!
//! Every document owns one [`OptionStore`]. It holds a typed value for each
//! [`OptionId`], validates updates against the option's declared type, range
//! or picklist, applies the fixed table of coupling rules, notifies a change
//! callback, and supports one outstanding snapshot for later restore and diff.
//!
//! Options can also be read from `name: value` configuration files:
//!
//! ```text
//! # comments start with '#' or '//'
//! indent: auto
//! wrap: 80
//! new-blocklevel-tags: x-card,
//!     x-panel
//! ```

pub mod error;
pub mod file;
pub mod options;
pub mod store;
pub mod values;

pub use error::ConfigError;
pub use file::{ConfigEntry, parse_config};
pub use options::{OptionCategory, OptionDef, OptionId, OptionKind, OptionType, OptionValue};
pub use store::{ChangeCallback, OptionStore};
pub use values::{
    AttributeSort, AutoBool, BadCharRefs, DetectedDoctype, DoctypeChoice, Encoding, Newline,
};
