//! Line assembly: indentation, wrapping and source line tracking.
//!
//! The printer hands the writer *atoms* (a word, a tag, one attribute) and
//! soft breaks between them. An atom is never split; a soft break becomes
//! either a single space or, when the next atom would pass the wrap column,
//! a new line at the current indent. Verbatim text bypasses all of this.

use kempt_common::SourcePos;

use crate::options::PrintOptions;
use crate::record::PrettyPrintRecord;

/// Receives each record as it is produced.
pub(crate) type ProgressCallback<'a> = Box<dyn FnMut(&PrettyPrintRecord) + 'a>;

pub(crate) struct LineWriter<'a> {
    wrap: usize,
    indent_unit: String,
    indent_width: usize,
    tab_size: usize,
    depth: usize,
    out: String,
    line: String,
    width: usize,
    has_content: bool,
    pending_space: bool,
    block_start: bool,
    line_source: Option<SourcePos>,
    dest_line: usize,
    records: Vec<PrettyPrintRecord>,
    progress: Option<ProgressCallback<'a>>,
}

impl<'a> LineWriter<'a> {
    pub(crate) fn new(options: &PrintOptions) -> Self {
        let indent_unit = if options.indent_with_tabs {
            "\t".to_owned()
        } else {
            " ".repeat(options.indent_spaces)
        };
        Self {
            wrap: options.wrap,
            indent_unit,
            indent_width: options.indent_width(),
            tab_size: options.tab_size,
            depth: 0,
            out: String::new(),
            line: String::new(),
            width: 0,
            has_content: false,
            pending_space: false,
            block_start: false,
            line_source: None,
            dest_line: 1,
            records: Vec::new(),
            progress: None,
        }
    }

    pub(crate) fn set_progress(&mut self, callback: ProgressCallback<'a>) {
        self.progress = Some(callback);
    }

    /// Indent level for lines started from now on.
    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// A soft break. Ignored at the start of a line and directly after
    /// [`LineWriter::open_block`].
    pub(crate) fn space(&mut self) {
        if self.has_content && !self.block_start {
            self.pending_space = true;
        }
    }

    /// Drop leading whitespace of the content that follows.
    pub(crate) fn open_block(&mut self) {
        self.pending_space = false;
        self.block_start = true;
    }

    pub(crate) fn cancel_space(&mut self) {
        self.pending_space = false;
    }

    /// Write an unbreakable piece of output.
    pub(crate) fn atom(&mut self, text: &str, pos: Option<SourcePos>) {
        let width = self.measure(text);
        self.block_start = false;
        if !self.has_content {
            self.begin_line(pos);
        } else if std::mem::take(&mut self.pending_space) {
            if self.wrap > 0 && self.width + 1 + width > self.wrap {
                self.flush_line();
                self.begin_line(pos);
            } else {
                self.line.push(' ');
                self.width += 1;
            }
        }
        self.line.push_str(text);
        self.width += width;
    }

    /// Append text directly after the previous output, with no indentation,
    /// soft break or wrapping.
    pub(crate) fn glue(&mut self, text: &str, pos: Option<SourcePos>) {
        if text.is_empty() {
            return;
        }
        self.pending_space = false;
        self.block_start = false;
        if !self.has_content {
            self.has_content = true;
            self.line_source = pos;
        }
        self.line.push_str(text);
        self.width += self.measure(text);
    }

    /// Write text whose line breaks must be kept exactly, such as the
    /// content of `<pre>`. `pos` is where the text started in the source.
    pub(crate) fn verbatim(&mut self, text: &str, pos: Option<SourcePos>) {
        let mut cursor = pos;
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.flush_line();
                if let Some(p) = cursor.as_mut() {
                    p.advance('\n');
                }
            }
            self.glue(segment, cursor);
            if let Some(p) = cursor.as_mut() {
                segment.chars().for_each(|c| p.advance(c));
            }
        }
    }

    /// End the current line if it has any content.
    pub(crate) fn newline(&mut self) {
        if self.has_content {
            self.flush_line();
        }
        self.pending_space = false;
    }

    /// Finish the last line and hand back the text and records.
    pub(crate) fn finish(mut self) -> (String, Vec<PrettyPrintRecord>) {
        self.newline();
        (self.out, self.records)
    }

    fn begin_line(&mut self, pos: Option<SourcePos>) {
        for _ in 0..self.depth {
            self.line.push_str(&self.indent_unit);
        }
        self.width = self.depth * self.indent_width;
        self.has_content = true;
        self.line_source = pos;
    }

    fn flush_line(&mut self) {
        self.out.push_str(&self.line);
        self.out.push('\n');
        if let Some(source) = self.line_source.take()
            && source.line != self.dest_line
        {
            let record = PrettyPrintRecord {
                source_line: source.line,
                source_column: source.column,
                dest_line: self.dest_line,
            };
            if let Some(callback) = self.progress.as_mut() {
                callback(&record);
            }
            self.records.push(record);
        }
        self.dest_line += 1;
        self.line.clear();
        self.width = 0;
        self.has_content = false;
        self.pending_space = false;
        self.block_start = false;
    }

    fn measure(&self, text: &str) -> usize {
        text.chars()
            .map(|c| if c == '\t' { self.tab_size } else { 1 })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn writer(wrap: usize) -> LineWriter<'static> {
        LineWriter::new(&PrintOptions {
            wrap,
            ..PrintOptions::default()
        })
    }

    #[test]
    fn wraps_only_between_atoms() {
        let mut w = writer(10);
        for word in ["alpha", "beta", "gamma", "extraordinarily"] {
            w.atom(word, None);
            w.space();
        }
        let (text, _) = w.finish();
        assert_eq!(text, "alpha beta\ngamma\nextraordinarily\n");
    }

    #[test]
    fn indents_new_lines() {
        let mut w = writer(0);
        w.set_depth(2);
        w.atom("<p>", None);
        w.newline();
        w.newline();
        let (text, _) = w.finish();
        assert_eq!(text, "    <p>\n");
    }

    #[test]
    fn verbatim_keeps_blank_lines_and_skips_indent() {
        let mut w = writer(0);
        w.set_depth(1);
        w.atom("<pre>", None);
        w.verbatim("a\n\n  b", None);
        w.glue("</pre>", None);
        let (text, _) = w.finish();
        assert_eq!(text, "  <pre>a\n\n  b</pre>\n");
    }

    #[test]
    fn records_lines_that_moved() {
        let mut w = writer(0);
        w.atom("one", Some(SourcePos::new(1, 1)));
        w.newline();
        w.atom("two", Some(SourcePos::new(1, 5)));
        w.newline();
        w.atom("three", Some(SourcePos::new(3, 1)));
        let (_, records) = w.finish();
        assert_eq!(
            records,
            vec![PrettyPrintRecord {
                source_line: 1,
                source_column: 5,
                dest_line: 2,
            }]
        );
    }
}
