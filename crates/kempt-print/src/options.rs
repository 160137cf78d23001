//! Printer settings, resolved from the option store once per print.

use kempt_config::{AttributeSort, AutoBool, OptionId, OptionStore};

/// Everything the printer consults while laying out a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PrintOptions {
    /// Whether block content is indented.
    pub indent: AutoBool,
    /// Spaces per indent level.
    pub indent_spaces: usize,
    /// Indent with one tab per level instead of spaces.
    pub indent_with_tabs: bool,
    /// Columns a tab counts for when measuring line width.
    pub tab_size: usize,
    /// Wrap column; 0 disables wrapping.
    pub wrap: usize,
    /// Attribute order.
    pub sort_attributes: AttributeSort,
    /// Upper case element names.
    pub uppercase_tags: bool,
    /// Upper case attribute names.
    pub uppercase_attributes: bool,
    /// Write `"` and `'` in text as references.
    pub quote_marks: bool,
    /// Write `&` in text as `&amp;`.
    pub quote_ampersand: bool,
    /// Write U+00A0 as a reference.
    pub quote_nbsp: bool,
    /// Prefer numeric references over named ones.
    pub numeric_entities: bool,
    /// Write XHTML syntax.
    pub xhtml: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::from_store(&OptionStore::new())
    }
}

impl PrintOptions {
    /// Read the pretty-print options out of a store.
    #[must_use]
    pub fn from_store(store: &OptionStore) -> Self {
        let int = |id| usize::try_from(store.get_int(id)).unwrap_or(usize::MAX);
        Self {
            indent: store.get_choice(OptionId::Indent),
            indent_spaces: int(OptionId::IndentSpaces),
            indent_with_tabs: store.get_bool(OptionId::IndentWithTabs),
            tab_size: int(OptionId::TabSize).max(1),
            wrap: int(OptionId::Wrap),
            sort_attributes: store.get_choice(OptionId::SortAttributes),
            uppercase_tags: store.get_bool(OptionId::UppercaseTags),
            uppercase_attributes: store.get_bool(OptionId::UppercaseAttributes),
            quote_marks: store.get_bool(OptionId::QuoteMarks),
            quote_ampersand: store.get_bool(OptionId::QuoteAmpersand),
            quote_nbsp: store.get_bool(OptionId::QuoteNbsp),
            numeric_entities: store.get_bool(OptionId::NumericEntities),
            xhtml: store.get_bool(OptionId::OutputXhtml),
        }
    }

    /// Columns occupied by one indent level.
    #[must_use]
    pub const fn indent_width(&self) -> usize {
        if self.indent_with_tabs {
            self.tab_size
        } else {
            self.indent_spaces
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_store() {
        let options = PrintOptions::default();
        assert_eq!(options.indent, AutoBool::No);
        assert_eq!(options.indent_spaces, 2);
        assert_eq!(options.wrap, 68);
        assert!(options.quote_ampersand);
        assert!(!options.xhtml);
    }

    #[test]
    fn reads_changed_values() {
        let mut store = OptionStore::new();
        store.set_by_name("indent", "auto").unwrap();
        store.set_by_name("wrap", "0").unwrap();
        store.set_by_name("indent-with-tabs", "yes").unwrap();
        store.set_by_name("tab-size", "4").unwrap();
        let options = PrintOptions::from_store(&store);
        assert_eq!(options.indent, AutoBool::Auto);
        assert_eq!(options.wrap, 0);
        assert_eq!(options.indent_width(), 4);
    }
}
