//! Character escaping for text and attribute values.

use crate::options::PrintOptions;

/// Escape character data for output.
pub(crate) fn escape_text(text: &str, options: &PrintOptions) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' if options.quote_ampersand => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if options.quote_marks => out.push_str("&quot;"),
            '\'' if options.quote_marks => out.push_str("&#39;"),
            '\u{A0}' if options.quote_nbsp => out.push_str(nbsp(options)),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted context.
pub(crate) fn escape_attribute(value: &str, options: &PrintOptions) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' if options.quote_ampersand => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{A0}' if options.quote_nbsp => out.push_str(nbsp(options)),
            _ => out.push(c),
        }
    }
    out
}

const fn nbsp(options: &PrintOptions) -> &'static str {
    if options.numeric_entities {
        "&#160;"
    } else {
        "&nbsp;"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_escapes_markup_characters() {
        let options = PrintOptions::default();
        assert_eq!(escape_text("a < b & c > d", &options), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_text("\"quoted\"", &options), "\"quoted\"");
        assert_eq!(escape_text("x\u{A0}y", &options), "x&nbsp;y");
    }

    #[test]
    fn text_escaping_follows_options() {
        let options = PrintOptions {
            quote_marks: true,
            quote_ampersand: false,
            numeric_entities: true,
            ..PrintOptions::default()
        };
        assert_eq!(escape_text("'&'", &options), "&#39;&&#39;");
        assert_eq!(escape_text("\"\u{A0}", &options), "&quot;&#160;");
    }

    #[test]
    fn attribute_values_escape_quotes_and_ampersands() {
        let options = PrintOptions::default();
        assert_eq!(
            escape_attribute("a\"b&c<d", &options),
            "a&quot;b&amp;c<d"
        );
    }
}
