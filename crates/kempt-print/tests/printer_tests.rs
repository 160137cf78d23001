//! Integration tests for the pretty printer: parse, print, compare.

use kempt_common::MessageLog;
use kempt_config::{AttributeSort, AutoBool, Encoding, OptionStore};
use kempt_dom::NodeId;
use kempt_html::{BuilderOptions, parse_document};
use kempt_print::{OutputSink, PrettyPrintRecord, PrettyPrinter, PrintOptions, PrintedDocument};
use pretty_assertions::assert_eq;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

fn print_with(html: &str, options: PrintOptions) -> PrintedDocument {
    let mut log = MessageLog::new();
    let outcome = parse_document(html, BuilderOptions::default(), &mut log);
    PrettyPrinter::new(&outcome.tree, options).print(NodeId::ROOT)
}

fn print(html: &str) -> String {
    print_with(html, PrintOptions::default()).text
}

fn with_indent(indent: AutoBool) -> PrintOptions {
    PrintOptions {
        indent,
        ..PrintOptions::default()
    }
}

/// The body content of a default print, one entry per line.
fn body_lines(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.trim().eq_ignore_ascii_case("<body>"))
        .unwrap()
        + 1;
    let end = lines
        .iter()
        .rposition(|l| l.trim().eq_ignore_ascii_case("</body>"))
        .unwrap();
    lines[start..end].to_vec()
}

#[test]
fn test_minimal_document() {
    assert_eq!(
        print("hello"),
        "<html>\n<head>\n<title></title>\n</head>\n<body>\nhello\n</body>\n</html>\n"
    );
}

#[test]
fn test_doctype_and_comment_get_their_own_lines() {
    let text = print("<!DOCTYPE html><!-- top --><p>x</p>");
    assert!(text.starts_with("<!DOCTYPE html>\n<!-- top -->\n<html>\n"));
}

#[test]
fn test_auto_indent_nests_block_content() {
    let text = print_with(
        "<ul><li>a</li><li>b</li></ul>",
        with_indent(AutoBool::Auto),
    )
    .text;
    assert_eq!(
        text,
        "<html>\n<head>\n  <title></title>\n</head>\n<body>\n  <ul>\n    <li>a</li>\n    \
         <li>b</li>\n  </ul>\n</body>\n</html>\n"
    );
}

#[test]
fn test_indent_no_keeps_block_lines_flush() {
    let text = print("<div><p>a</p><p>b</p></div>");
    assert_eq!(body_lines(&text), vec!["<div>", "<p>a</p>", "<p>b</p>", "</div>"]);
}

#[test]
fn test_indent_yes_puts_inline_content_on_its_own_line() {
    let text = print_with("<p>hello world</p>", with_indent(AutoBool::Yes)).text;
    assert_eq!(
        body_lines(&text),
        vec!["  <p>", "    hello world", "  </p>"]
    );
}

#[test]
fn test_indent_with_tabs() {
    let options = PrintOptions {
        indent: AutoBool::Auto,
        indent_with_tabs: true,
        ..PrintOptions::default()
    };
    let text = print_with("<div><p>a</p></div>", options).text;
    assert_eq!(body_lines(&text), vec!["\t<div>", "\t\t<p>a</p>", "\t</div>"]);
}

#[test]
fn test_wrap_breaks_between_words() {
    let options = PrintOptions {
        wrap: 20,
        ..PrintOptions::default()
    };
    let text = print_with("<p>aaaa bbbb cccc dddd eeee</p>", options).text;
    assert_eq!(body_lines(&text), vec!["<p>aaaa bbbb cccc", "dddd eeee</p>"]);
}

#[test]
fn test_long_words_overflow_instead_of_splitting() {
    let options = PrintOptions {
        wrap: 10,
        ..PrintOptions::default()
    };
    let text = print_with("<p>abcdefghijklmnop q</p>", options).text;
    assert_eq!(body_lines(&text), vec!["<p>abcdefghijklmnop", "q</p>"]);
}

#[test]
fn test_wrap_zero_never_breaks() {
    let long = "word ".repeat(40);
    let options = PrintOptions {
        wrap: 0,
        ..PrintOptions::default()
    };
    let text = print_with(&format!("<p>{long}</p>"), options).text;
    assert_eq!(body_lines(&text).len(), 1);
}

#[test]
fn test_whitespace_is_collapsed_and_trimmed_in_blocks() {
    let text = print("<p>  a \n\n  b  </p>");
    assert_eq!(body_lines(&text), vec!["<p>a b</p>"]);
}

#[test]
fn test_inline_elements_flow_with_text() {
    let text = print("<p>one <b>two</b> <i>three</i>.</p>");
    assert_eq!(body_lines(&text), vec!["<p>one <b>two</b> <i>three</i>.</p>"]);
}

#[test]
fn test_br_forces_a_line_break() {
    let text = print("<p>a<br>b</p>");
    assert_eq!(body_lines(&text), vec!["<p>a<br>", "b</p>"]);
}

#[test]
fn test_pre_content_is_verbatim() {
    let text = print("<div><pre>  a\n     b  &lt;</pre></div>");
    assert!(text.contains("<pre>  a\n     b  &lt;</pre>\n"));
}

#[test]
fn test_pre_leading_newline_survives() {
    let text = print("<pre>\n\nx</pre>");
    assert!(text.contains("<pre>\n\nx</pre>\n"));
}

#[test]
fn test_script_is_not_escaped() {
    let text = print("<script>if (a < b && c) {}</script>");
    assert!(text.contains("<script>if (a < b && c) {}</script>\n"));
}

#[test]
fn test_text_is_escaped() {
    let text = print("<p>a &lt; b &amp; c</p>");
    assert_eq!(body_lines(&text), vec!["<p>a &lt; b &amp; c</p>"]);
}

#[test]
fn test_nbsp_written_as_reference() {
    assert_eq!(body_lines(&print("<p>a&nbsp;b</p>")), vec!["<p>a&nbsp;b</p>"]);
    let numeric = PrintOptions {
        numeric_entities: true,
        ..PrintOptions::default()
    };
    let text = print_with("<p>a&nbsp;b</p>", numeric).text;
    assert_eq!(body_lines(&text), vec!["<p>a&#160;b</p>"]);
}

#[test]
fn test_attribute_values_are_quoted_and_escaped() {
    let text = print("<p><a href=a&amp;b title='say \"hi\"'>x</a></p>");
    assert_eq!(
        body_lines(&text),
        vec!["<p><a href=\"a&amp;b\" title=\"say &quot;hi&quot;\">x</a></p>"]
    );
}

#[test]
fn test_sorted_attributes() {
    let options = PrintOptions {
        sort_attributes: AttributeSort::Alpha,
        ..PrintOptions::default()
    };
    let text = print_with("<p id=y class=x lang=en>z</p>", options).text;
    assert_eq!(body_lines(&text), vec!["<p class=\"x\" id=\"y\" lang=\"en\">z</p>"]);
}

#[test]
fn test_boolean_attributes() {
    let html = "<input type=checkbox checked>";
    assert_eq!(body_lines(&print(html)), vec!["<input type=\"checkbox\" checked>"]);

    let xhtml = PrintOptions {
        xhtml: true,
        ..PrintOptions::default()
    };
    let text = print_with(html, xhtml).text;
    assert_eq!(
        body_lines(&text),
        vec!["<input type=\"checkbox\" checked=\"checked\" />"]
    );
}

#[test]
fn test_xhtml_void_elements() {
    let xhtml = PrintOptions {
        xhtml: true,
        ..PrintOptions::default()
    };
    let text = print_with("<p>a<br>b</p><hr>", xhtml).text;
    assert_eq!(body_lines(&text), vec!["<p>a<br />", "b</p>", "<hr />"]);
}

#[test]
fn test_uppercase_names() {
    let options = PrintOptions {
        uppercase_tags: true,
        uppercase_attributes: true,
        ..PrintOptions::default()
    };
    let text = print_with("<p class=x>y</p>", options).text;
    assert!(text.starts_with("<HTML>\n<HEAD>\n"));
    assert_eq!(body_lines(&text), vec!["<P CLASS=\"x\">y</P>"]);
}

#[test]
fn test_tables_get_block_layout() {
    let text = print("<table><tr><td>1</td><td>2</td></tr></table>");
    assert_eq!(
        body_lines(&text),
        vec![
            "<table>",
            "<tbody>",
            "<tr>",
            "<td>1</td>",
            "<td>2</td>",
            "</tr>",
            "</tbody>",
            "</table>"
        ]
    );
}

#[test]
fn test_print_contents_prints_only_the_children() {
    let mut log = MessageLog::new();
    let outcome = parse_document("<p>a</p><p>b</p>", BuilderOptions::default(), &mut log);
    let body = outcome.tree.body().unwrap();
    let printed = PrettyPrinter::new(&outcome.tree, PrintOptions::default()).print_contents(body);
    assert_eq!(printed.text, "<p>a</p>\n<p>b</p>\n");
}

#[test]
fn test_records_map_moved_lines() {
    let printed = print_with("<p>a</p>\n\n\n<p>b</p>", PrintOptions::default());
    assert_eq!(printed.text.lines().nth(6), Some("<p>b</p>"));
    assert!(printed.records.contains(&PrettyPrintRecord {
        source_line: 4,
        source_column: 1,
        dest_line: 7,
    }));
    assert!(printed.records.iter().all(|r| r.source_line != r.dest_line));
}

#[test]
fn test_progress_callback_sees_every_record() {
    let mut log = MessageLog::new();
    let outcome = parse_document("<p>a</p>\n\n<p>b</p>", BuilderOptions::default(), &mut log);
    let mut seen = Vec::new();
    let printed = PrettyPrinter::new(&outcome.tree, PrintOptions::default())
        .on_progress(|record| seen.push(*record))
        .print(NodeId::ROOT);
    assert!(!seen.is_empty());
    assert_eq!(seen, printed.records);
}

#[test]
fn test_sink_from_store() {
    let mut store = OptionStore::new();
    store.set_by_name("newline", "crlf").unwrap();
    store.set_by_name("output-encoding", "ascii").unwrap();
    let sink = OutputSink::from_store(&store);
    assert_eq!(sink.encoding, Encoding::Ascii);
    let mut out = Vec::new();
    sink.write("<p>\u{E9}</p>\n", &mut out).unwrap();
    assert_eq!(out, b"<p>&eacute;</p>\r\n");
}

#[test]
fn test_print_options_from_store() {
    let mut store = OptionStore::new();
    store.set_by_name("indent", "auto").unwrap();
    store.set_by_name("sort-attributes", "alpha").unwrap();
    let options = PrintOptions::from_store(&store);
    assert_eq!(options.indent, AutoBool::Auto);
    assert_eq!(options.sort_attributes, AttributeSort::Alpha);
}

fn assert_idempotent(html: &str, options: &PrintOptions) {
    let first = print_with(html, options.clone()).text;
    let second = print_with(&first, options.clone()).text;
    assert_eq!(first, second, "input: {html:?}");
}

#[test]
fn test_printing_is_idempotent() {
    let samples = [
        "hello",
        "<p>a<p>b",
        "<ul><li>one<li>two</ul>",
        "<table><tr><td>a<td>b</table>",
        "<div>text <b>bold</b> <p>para</p> tail</div>",
        "<pre>\n  keep\n    this</pre>",
        "<p>a<br>b<br></p>",
        "<h1>Title</h2><p>x &amp; y</p>",
        "<!-- c --><p>x<!-- inline -->y</p>",
        "<script>var a = 1 < 2;</script><style>p { color: red }</style>",
        "<dl><dt>t<dd>d</dl>",
        "<p>The quick brown fox jumps over the lazy dog and keeps running far away.</p>",
    ];
    for indent in [AutoBool::No, AutoBool::Auto, AutoBool::Yes] {
        let options = PrintOptions {
            wrap: 30,
            ..with_indent(indent)
        };
        for sample in samples {
            assert_idempotent(sample, &options);
        }
    }
}

/// Markup assembled from well-behaved pieces.
#[derive(Debug, Clone)]
struct Markup(String);

impl Arbitrary for Markup {
    fn arbitrary(g: &mut Gen) -> Self {
        const PIECES: &[&str] = &[
            "<p>", "</p>", "<b>", "</b>", "<em>", "</em>", "<div>", "</div>", "<ul>", "<li>",
            "</ul>", "<h1>", "</h1>", "<br>", "word", "two words", " ", "\n", "&amp;",
            "<!--note-->",
        ];
        let len = usize::arbitrary(g) % 24;
        let text = (0..len)
            .map(|_| *g.choose(PIECES).unwrap_or(&""))
            .collect();
        Self(text)
    }
}

#[quickcheck]
fn prop_printing_is_idempotent(markup: Markup) -> bool {
    let first = print(&markup.0);
    first == print(&first)
}

#[quickcheck]
fn prop_indented_printing_is_idempotent(markup: Markup) -> bool {
    let options = with_indent(AutoBool::Auto);
    let first = print_with(&markup.0, options.clone()).text;
    first == print_with(&first, options).text
}
