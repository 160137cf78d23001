//! Config file syntax.
//!
//! One `name: value` (or `name = value`) pair per line. Lines starting with
//! `#` or `//` are comments. A line that starts with whitespace continues the
//! previous value, joined with a single space.

/// One option setting read from a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// 1-based line where the setting starts.
    pub line: usize,
    /// The option name as written.
    pub name: String,
    /// The value, with continuation lines joined.
    pub value: String,
}

/// Split config text into entries.
///
/// A line with no separator becomes an entry whose name is the whole line
/// and whose value is empty, so the caller reports it as an unknown option.
#[must_use]
pub fn parse_config(text: &str) -> Vec<ConfigEntry> {
    let mut entries: Vec<ConfigEntry> = Vec::new();
    let mut continuable = false;

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continuable = false;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        let indented = raw.starts_with(char::is_whitespace);
        if indented
            && continuable
            && let Some(last) = entries.last_mut()
        {
            if !last.value.is_empty() {
                last.value.push(' ');
            }
            last.value.push_str(trimmed);
            continue;
        }

        let separator = trimmed.find([':', '=']);
        let entry = match separator {
            Some(at) => ConfigEntry {
                line: index + 1,
                name: trimmed[..at].trim().to_owned(),
                value: trimmed[at + 1..].trim().to_owned(),
            },
            None => ConfigEntry {
                line: index + 1,
                name: trimmed.to_owned(),
                value: String::new(),
            },
        };
        continuable = separator.is_some();
        entries.push(entry);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_pairs_comments_and_continuations() {
        let text = "# a comment\n\
                    indent: auto\n\
                    // another\n\
                    wrap = 80\n\
                    new-blocklevel-tags: x-card,\n    x-panel\n";
        let entries = parse_config(text);
        assert_eq!(
            entries,
            vec![
                ConfigEntry {
                    line: 2,
                    name: "indent".into(),
                    value: "auto".into(),
                },
                ConfigEntry {
                    line: 4,
                    name: "wrap".into(),
                    value: "80".into(),
                },
                ConfigEntry {
                    line: 5,
                    name: "new-blocklevel-tags".into(),
                    value: "x-card, x-panel".into(),
                },
            ]
        );
    }

    #[test]
    fn line_without_separator_is_kept_as_a_name() {
        let entries = parse_config("garbage here\n");
        assert_eq!(entries[0].name, "garbage here");
        assert_eq!(entries[0].value, "");
    }

    #[test]
    fn first_separator_wins() {
        let entries = parse_config("error-file: C:=x\n");
        assert_eq!(entries[0].name, "error-file");
        assert_eq!(entries[0].value, "C:=x");
    }
}
