//! The per-document option store.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use strum::IntoEnumIterator;

use crate::error::ConfigError;
use crate::file::parse_config;
use crate::options::{OptionDef, OptionId, OptionKind, OptionValue};

/// Called after every effective change, including changes made by coupling
/// rules and resets.
pub type ChangeCallback = Box<dyn FnMut(OptionId, &OptionValue) + Send>;

/// A coupling rule: when `trigger` changes, `apply` names the options that
/// follow it.
struct Coupling {
    trigger: OptionId,
    apply: fn(&OptionValue) -> Vec<(OptionId, OptionValue)>,
}

const COUPLINGS: &[Coupling] = &[
    Coupling {
        trigger: OptionId::IndentWithTabs,
        apply: tabs_use_one_indent_unit,
    },
    Coupling {
        trigger: OptionId::CharEncoding,
        apply: char_encoding_sets_both_directions,
    },
    Coupling {
        trigger: OptionId::OutputXhtml,
        apply: xhtml_excludes_html,
    },
    Coupling {
        trigger: OptionId::OutputHtml,
        apply: html_excludes_xhtml,
    },
];

fn tabs_use_one_indent_unit(value: &OptionValue) -> Vec<(OptionId, OptionValue)> {
    match value {
        OptionValue::Bool(true) => vec![(OptionId::IndentSpaces, OptionValue::Int(1))],
        _ => Vec::new(),
    }
}

fn char_encoding_sets_both_directions(value: &OptionValue) -> Vec<(OptionId, OptionValue)> {
    vec![
        (OptionId::InputEncoding, value.clone()),
        (OptionId::OutputEncoding, value.clone()),
    ]
}

fn xhtml_excludes_html(value: &OptionValue) -> Vec<(OptionId, OptionValue)> {
    match value {
        OptionValue::Bool(true) => vec![(OptionId::OutputHtml, OptionValue::Bool(false))],
        _ => Vec::new(),
    }
}

fn html_excludes_xhtml(value: &OptionValue) -> Vec<(OptionId, OptionValue)> {
    match value {
        OptionValue::Bool(true) => vec![(OptionId::OutputXhtml, OptionValue::Bool(false))],
        _ => Vec::new(),
    }
}

/// Parse the boolean spellings accepted in config files and on the command
/// line.
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" | "on" => Some(true),
        "no" | "n" | "false" | "f" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Split a list value on commas and whitespace, drop duplicates, and join
/// the names back as `"a, b, c"`.
fn canonicalize_list(text: &str) -> String {
    let mut names: Vec<&str> = Vec::new();
    for name in text.split(|c: char| c == ',' || c.is_whitespace()) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(", ")
}

/// Check `value` against `def` and return the canonical form to store.
fn validate(def: &OptionDef, value: OptionValue) -> Result<OptionValue, ConfigError> {
    let mismatch = || ConfigError::TypeMismatch {
        option: def.id,
        expected: def.option_type(),
    };
    match (def.kind, value) {
        (OptionKind::String, value @ OptionValue::Str(_))
        | (OptionKind::Boolean, value @ OptionValue::Bool(_)) => Ok(value),
        (OptionKind::List, OptionValue::Str(text)) => {
            Ok(OptionValue::Str(canonicalize_list(&text)))
        }
        (OptionKind::Integer { min, max }, OptionValue::Int(n)) => {
            if (min..=max).contains(&n) {
                Ok(OptionValue::Int(n))
            } else {
                Err(ConfigError::OutOfRange {
                    option: def.id,
                    value: i128::from(n),
                    min,
                    max,
                })
            }
        }
        (OptionKind::Picklist(labels), OptionValue::Choice(label)) => {
            pick_label(def, labels, label)
        }
        (OptionKind::Picklist(labels), OptionValue::Str(text)) => pick_label(def, labels, &text),
        (OptionKind::Picklist(labels), OptionValue::Bool(flag)) if labels.contains(&"yes") => {
            pick_label(def, labels, if flag { "yes" } else { "no" })
        }
        _ => Err(mismatch()),
    }
}

fn pick_label(
    def: &OptionDef,
    labels: &'static [&'static str],
    text: &str,
) -> Result<OptionValue, ConfigError> {
    let text = text.trim();
    if let Some(label) = labels.iter().find(|l| l.eq_ignore_ascii_case(text)) {
        return Ok(OptionValue::Choice(*label));
    }
    // yes/no pick lists also take the other boolean spellings.
    if labels.contains(&"yes")
        && labels.contains(&"no")
        && let Some(flag) = parse_bool(text)
    {
        return Ok(OptionValue::Choice(if flag { "yes" } else { "no" }));
    }
    Err(ConfigError::NotInPicklist {
        option: def.id,
        value: text.to_owned(),
        allowed: labels.join(", "),
    })
}

/// Typed values for every option, with one outstanding snapshot.
pub struct OptionStore {
    values: Vec<OptionValue>,
    snapshot: Option<Vec<OptionValue>>,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for OptionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionStore")
            .field("values", &self.values)
            .field("snapshot", &self.snapshot.is_some())
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for OptionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn default_values() -> Vec<OptionValue> {
    OptionId::iter().map(|id| id.def().default).collect()
}

impl OptionStore {
    /// A store holding every option's default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: default_values(),
            snapshot: None,
            on_change: None,
        }
    }

    /// Register the change callback, replacing any previous one.
    pub fn on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    /// Remove the change callback.
    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// Find a public option by name, case-insensitively.
    #[must_use]
    pub fn lookup(name: &str) -> Option<OptionId> {
        OptionId::from_str(name.trim())
            .ok()
            .filter(|id| !id.is_internal())
    }

    /// The current value.
    #[must_use]
    pub fn get(&self, id: OptionId) -> &OptionValue {
        &self.values[id.index()]
    }

    /// The value of a boolean option. Anything else reads as `false`.
    #[must_use]
    pub fn get_bool(&self, id: OptionId) -> bool {
        matches!(self.get(id), OptionValue::Bool(true))
    }

    /// The value of an integer option. Anything else reads as 0.
    #[must_use]
    pub fn get_int(&self, id: OptionId) -> u64 {
        match self.get(id) {
            OptionValue::Int(n) => *n,
            _ => 0,
        }
    }

    /// The text of a string, list or picklist option.
    #[must_use]
    pub fn get_str(&self, id: OptionId) -> &str {
        match self.get(id) {
            OptionValue::Str(s) => s,
            OptionValue::Choice(label) => label,
            OptionValue::Int(_) | OptionValue::Bool(_) => "",
        }
    }

    /// The names in a list option.
    #[must_use]
    pub fn get_list(&self, id: OptionId) -> Vec<&str> {
        self.get_str(id)
            .split(", ")
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// A picklist option as its typed enum.
    #[must_use]
    pub fn get_choice<T: FromStr + Default>(&self, id: OptionId) -> T {
        T::from_str(self.get_str(id)).unwrap_or_default()
    }

    /// Validate and store a value, then apply coupling rules. The rules run
    /// even when the value is unchanged.
    ///
    /// # Errors
    ///
    /// Fails for internal or read-only options and for values that do not
    /// fit the option's type, range or picklist. The store is unchanged on
    /// error.
    pub fn set(&mut self, id: OptionId, value: impl Into<OptionValue>) -> Result<(), ConfigError> {
        if id.is_internal() {
            return Err(ConfigError::UnknownOption(id.name().to_owned()));
        }
        let def = id.def();
        if def.read_only {
            return Err(ConfigError::ReadOnly(id));
        }
        let value = validate(&def, value.into())?;
        self.assign(id, value);
        self.apply_couplings(id);
        Ok(())
    }

    /// Store a value on behalf of the library itself. Read-only and internal
    /// options are accepted; the value is still validated.
    ///
    /// # Errors
    ///
    /// Fails when the value does not fit the option.
    pub fn force(&mut self, id: OptionId, value: impl Into<OptionValue>) -> Result<(), ConfigError> {
        let value = validate(&id.def(), value.into())?;
        self.assign(id, value);
        self.apply_couplings(id);
        Ok(())
    }

    /// Parse `text` according to the option's type and store it.
    ///
    /// # Errors
    ///
    /// See [`OptionStore::set`]. Text that does not parse as the option's
    /// type gives [`ConfigError::TypeMismatch`]; a negative integer gives
    /// [`ConfigError::OutOfRange`].
    pub fn set_from_str(&mut self, id: OptionId, text: &str) -> Result<(), ConfigError> {
        let def = id.def();
        let text = text.trim();
        let value = match def.kind {
            OptionKind::Boolean => parse_bool(text).map(OptionValue::Bool),
            OptionKind::Integer { min, max } => match text.parse::<u64>() {
                Ok(n) => Some(OptionValue::Int(n)),
                // `-0` is zero; anything else that parses here is negative.
                Err(_) => match text.parse::<i64>() {
                    Ok(0) => Some(OptionValue::Int(0)),
                    Ok(negative) => {
                        return Err(ConfigError::OutOfRange {
                            option: id,
                            value: i128::from(negative),
                            min,
                            max,
                        });
                    }
                    Err(_) => None,
                },
            },
            OptionKind::String | OptionKind::List | OptionKind::Picklist(_) => {
                Some(OptionValue::Str(text.to_owned()))
            }
        };
        let value = value.ok_or(ConfigError::TypeMismatch {
            option: id,
            expected: def.option_type(),
        })?;
        self.set(id, value)
    }

    /// Look up an option by name and set it from text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownOption`] for names that are not public options,
    /// otherwise as [`OptionStore::set_from_str`].
    pub fn set_by_name(&mut self, name: &str, text: &str) -> Result<(), ConfigError> {
        let id = Self::lookup(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.trim().to_owned()))?;
        self.set_from_str(id, text)
    }

    /// Restore one option's default.
    pub fn reset_to_default(&mut self, id: OptionId) {
        self.assign(id, id.def().default);
    }

    /// Restore every option's default. Coupling rules are not applied.
    pub fn reset_all_to_default(&mut self) {
        self.restore(default_values());
    }

    /// Remember the current values. A later snapshot replaces this one.
    pub fn snapshot(&mut self) {
        self.snapshot = Some(self.values.clone());
    }

    /// Restore the snapshot, or the defaults when none was taken. The
    /// snapshot is kept.
    pub fn reset_to_snapshot(&mut self) {
        let saved = self.snapshot.clone().unwrap_or_else(default_values);
        self.restore(saved);
    }

    /// True when a snapshot is held.
    #[must_use]
    pub const fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Public options whose value differs from the default.
    #[must_use]
    pub fn diff_from_default(&self) -> Vec<OptionId> {
        self.diff_against(&default_values())
    }

    /// Public options whose value differs from the snapshot, or from the
    /// defaults when no snapshot is held.
    #[must_use]
    pub fn diff_from_snapshot(&self) -> Vec<OptionId> {
        match &self.snapshot {
            Some(saved) => self.diff_against(saved),
            None => self.diff_from_default(),
        }
    }

    /// True when any public option differs from its default.
    #[must_use]
    pub fn differs_from_default(&self) -> bool {
        !self.diff_from_default().is_empty()
    }

    /// True when any public option differs from the snapshot.
    #[must_use]
    pub fn differs_from_snapshot(&self) -> bool {
        !self.diff_from_snapshot().is_empty()
    }

    /// Take a snapshot of this store, then copy every non-internal value
    /// from `other`.
    pub fn copy_from(&mut self, other: &Self) {
        self.snapshot();
        for id in OptionId::iter().filter(|id| !id.is_internal()) {
            self.assign(id, other.get(id).clone());
        }
    }

    /// Every public option with its definition and current value, in
    /// declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionDef, &OptionValue)> + '_ {
        OptionId::iter()
            .filter(|id| !id.is_internal())
            .map(|id| (id.def(), self.get(id)))
    }

    /// Apply every `name: value` line of a config file.
    ///
    /// Returns the problems found, each with its 1-based line number. Lines
    /// that fail leave their option unchanged; the rest still apply.
    pub fn load_config_str(&mut self, text: &str) -> Vec<(usize, ConfigError)> {
        let mut problems = Vec::new();
        for entry in parse_config(text) {
            if let Err(err) = self.set_by_name(&entry.name, &entry.value) {
                log::debug!("config line {}: {err}", entry.line);
                problems.push((entry.line, err));
            }
        }
        problems
    }

    /// Read and apply a config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read. Problems within the
    /// file are returned as for [`OptionStore::load_config_str`].
    pub fn load_config_file(
        &mut self,
        path: &Path,
    ) -> Result<Vec<(usize, ConfigError)>, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.load_config_str(&text))
    }

    fn diff_against(&self, base: &[OptionValue]) -> Vec<OptionId> {
        OptionId::iter()
            .filter(|id| !id.is_internal() && !id.def().read_only)
            .filter(|id| base.get(id.index()) != Some(self.get(*id)))
            .collect()
    }

    fn restore(&mut self, saved: Vec<OptionValue>) {
        for (id, value) in OptionId::iter().zip(saved) {
            self.assign(id, value);
        }
    }

    fn apply_couplings(&mut self, trigger: OptionId) {
        let value = self.get(trigger).clone();
        for rule in COUPLINGS.iter().filter(|rule| rule.trigger == trigger) {
            for (id, coupled) in (rule.apply)(&value) {
                self.assign(id, coupled);
            }
        }
    }

    /// Store `value` and notify if it changed.
    fn assign(&mut self, id: OptionId, value: OptionValue) {
        let slot = &mut self.values[id.index()];
        if *slot == value {
            return;
        }
        log::trace!("option {id}: {slot} -> {value}");
        *slot = value;
        if let Some(callback) = self.on_change.as_mut() {
            callback(id, &self.values[id.index()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_canonicalized() {
        assert_eq!(canonicalize_list("one two,three,, one"), "one, two, three");
        assert_eq!(canonicalize_list("  "), "");
    }

    #[test]
    fn boolean_spellings() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
