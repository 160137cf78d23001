//! Tree to text.
//!
//! Layout follows each element's [`ContentModel`]:
//!
//! - Block elements start on a line of their own. Their content either
//!   follows the start tag on the same line (inline-only content) or goes on
//!   its own lines, one indent level deeper when `indent` is on.
//! - Inline content is flowed as words and tags, broken at whitespace when a
//!   line would pass the wrap column.
//! - Raw text (`script`, `style`) and preformatted content are written as
//!   they are, so printing never changes what a browser would render.

use kempt_common::SourcePos;
use kempt_config::{AttributeSort, AutoBool};
use kempt_dom::{Attribute, Category, ContentModel, DomTree, ElementData, NodeId, NodeType, TagId};

use crate::escape::{escape_attribute, escape_text};
use crate::layout::LineWriter;
use crate::options::PrintOptions;
use crate::record::PrettyPrintRecord;

/// The printed text and its line mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrintedDocument {
    /// The formatted markup, with `\n` line endings.
    pub text: String,
    /// One entry per output line that came from a different source line.
    pub records: Vec<PrettyPrintRecord>,
}

/// Lays out a [`DomTree`] as text.
pub struct PrettyPrinter<'a> {
    tree: &'a DomTree,
    options: PrintOptions,
    writer: LineWriter<'a>,
}

impl<'a> PrettyPrinter<'a> {
    /// A printer over `tree`.
    #[must_use]
    pub fn new(tree: &'a DomTree, options: PrintOptions) -> Self {
        let writer = LineWriter::new(&options);
        Self {
            tree,
            options,
            writer,
        }
    }

    /// Call `callback` with each [`PrettyPrintRecord`] as it is produced.
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(&PrettyPrintRecord) + 'a) -> Self {
        self.writer.set_progress(Box::new(callback));
        self
    }

    /// Print `root` and everything below it. For the document node this is
    /// the whole document.
    #[must_use]
    pub fn print(mut self, root: NodeId) -> PrintedDocument {
        log::debug!("printing from {root:?}");
        self.print_node(root, 0, true);
        self.finish()
    }

    /// Print only the children of `id`, e.g. the content of `<body>`.
    #[must_use]
    pub fn print_contents(mut self, id: NodeId) -> PrintedDocument {
        log::debug!("printing contents of {id:?}");
        self.print_children(id, 0, true);
        self.finish()
    }

    fn finish(self) -> PrintedDocument {
        let (text, records) = self.writer.finish();
        PrintedDocument { text, records }
    }

    fn print_children(&mut self, parent: NodeId, depth: usize, own_lines: bool) {
        let tree = self.tree;
        for &child in tree.children(parent) {
            self.print_node(child, depth, own_lines);
        }
    }

    /// `own_lines` is true where the parent lays its content out line by
    /// line rather than as flowed text.
    fn print_node(&mut self, id: NodeId, depth: usize, own_lines: bool) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };
        let pos = Some(node.pos);
        match &node.node_type {
            NodeType::Document => self.print_children(id, depth, true),
            NodeType::Text(text) => self.print_text(text, node.pos),
            NodeType::Element(data) => self.print_element(id, data, node.pos, depth),
            NodeType::Doctype { .. } | NodeType::XmlDeclaration(_) => {
                self.writer.newline();
                self.writer.set_depth(depth);
                self.markup_atom(&markup(&node.node_type), pos);
                self.writer.newline();
            }
            other => {
                if own_lines {
                    self.writer.newline();
                    self.writer.set_depth(depth);
                }
                self.markup_atom(&markup(other), pos);
                if own_lines {
                    self.writer.newline();
                }
            }
        }
    }

    /// Comments and declarations: one atom, unless they span lines, in which
    /// case the remainder is kept exactly.
    fn markup_atom(&mut self, text: &str, pos: Option<SourcePos>) {
        match text.split_once('\n') {
            None => self.writer.atom(text, pos),
            Some((first, rest)) => {
                self.writer.atom(first, pos);
                let mut cursor = pos;
                if let Some(p) = cursor.as_mut() {
                    first.chars().for_each(|c| p.advance(c));
                }
                self.writer.verbatim(&format!("\n{rest}"), cursor);
            }
        }
    }

    fn print_text(&mut self, text: &str, start: SourcePos) {
        let mut cursor = start;
        let mut word = String::new();
        let mut word_pos = start;
        for c in text.chars() {
            if c.is_ascii_whitespace() {
                if !word.is_empty() {
                    self.writer
                        .atom(&escape_text(&word, &self.options), Some(word_pos));
                    word.clear();
                }
                self.writer.space();
            } else {
                if word.is_empty() {
                    word_pos = cursor;
                }
                word.push(c);
            }
            cursor.advance(c);
        }
        if !word.is_empty() {
            self.writer
                .atom(&escape_text(&word, &self.options), Some(word_pos));
        }
    }

    fn print_element(&mut self, id: NodeId, data: &ElementData, pos: SourcePos, depth: usize) {
        let model = data.model;
        let block = starts_line(model);
        if block {
            self.writer.newline();
            self.writer.set_depth(depth);
        }

        self.start_tag_atoms(data, pos);

        if model.void {
            if block || data.tag == TagId::Br {
                self.writer.newline();
            }
            return;
        }

        let end_tag = self.end_tag(data);
        if model.preformatted || is_raw_text(data.tag) {
            if keeps_leading_newline(data.tag) && self.starts_with_newline(id) {
                self.writer.verbatim("\n", None);
            }
            self.print_verbatim_children(id, is_raw_text(data.tag));
            self.writer.glue(&end_tag, None);
            if block {
                self.writer.newline();
            }
            return;
        }

        if !block {
            self.print_children(id, depth, false);
            self.writer.atom(&end_tag, None);
            return;
        }

        let layout = self.block_layout(id, model);
        if layout.own_lines {
            let child_depth = if layout.indented && data.tag != TagId::Html {
                depth + 1
            } else {
                depth
            };
            self.writer.newline();
            self.writer.set_depth(child_depth);
            self.print_children(id, child_depth, true);
            self.writer.newline();
            self.writer.set_depth(depth);
        } else {
            self.writer.open_block();
            self.print_children(id, depth, false);
            self.writer.cancel_space();
        }
        self.writer.atom(&end_tag, None);
        self.writer.newline();
        self.writer.set_depth(depth);
    }

    fn block_layout(&self, id: NodeId, model: ContentModel) -> BlockLayout {
        let children = self.tree.children(id);
        let has_block_child = children.iter().any(|&child| {
            self.tree.as_element(child).is_some_and(|e| starts_line(e.model))
        });
        let has_content = children.iter().any(|&child| {
            self.tree
                .as_text(child)
                .is_none_or(|text| !text.trim_ascii().is_empty())
        });
        let indented = match self.options.indent {
            AutoBool::Yes => true,
            AutoBool::Auto => has_block_child,
            AutoBool::No => false,
        };
        let own_lines = if self.options.indent == AutoBool::Yes
            || model.category == Category::Structure
        {
            has_content
        } else {
            has_block_child
        };
        BlockLayout {
            own_lines,
            indented,
        }
    }

    fn starts_with_newline(&self, id: NodeId) -> bool {
        self.tree
            .first_child(id)
            .and_then(|child| self.tree.as_text(child))
            .is_some_and(|text| text.starts_with('\n'))
    }

    /// Children of a preformatted or raw text element, written as they are.
    fn print_verbatim_children(&mut self, id: NodeId, raw: bool) {
        let tree = self.tree;
        for &child in tree.children(id) {
            let Some(node) = tree.get(child) else {
                continue;
            };
            let pos = Some(node.pos);
            match &node.node_type {
                NodeType::Text(text) if raw => self.writer.verbatim(text, pos),
                NodeType::Text(text) => {
                    self.writer.verbatim(&escape_text(text, &self.options), pos);
                }
                NodeType::Element(data) => {
                    let start = self.start_tag_parts(data).join(" ");
                    self.writer.glue(&start, pos);
                    if !data.model.void {
                        self.print_verbatim_children(child, raw || is_raw_text(data.tag));
                        self.writer.glue(&self.end_tag(data), None);
                    }
                }
                other => self.writer.verbatim(&markup(other), pos),
            }
        }
    }

    fn start_tag_atoms(&mut self, data: &ElementData, pos: SourcePos) {
        let parts = self.start_tag_parts(data);
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                self.writer.space();
            }
            self.writer.atom(part, Some(pos));
        }
    }

    /// `<name`, then one entry per attribute, with the closing `>` on the
    /// last entry.
    fn start_tag_parts(&self, data: &ElementData) -> Vec<String> {
        let mut parts = vec![format!("<{}", self.element_name(data))];
        let mut attrs: Vec<&Attribute> = data.attrs.iter().collect();
        if self.options.sort_attributes == AttributeSort::Alpha {
            attrs.sort_by(|a, b| a.name.cmp(&b.name));
        }
        parts.extend(attrs.into_iter().map(|attr| self.attribute(attr)));
        let close = if data.model.void && self.options.xhtml {
            " />"
        } else {
            ">"
        };
        if let Some(last) = parts.last_mut() {
            last.push_str(close);
        }
        parts
    }

    fn end_tag(&self, data: &ElementData) -> String {
        format!("</{}>", self.element_name(data))
    }

    fn element_name(&self, data: &ElementData) -> String {
        if self.options.uppercase_tags && !self.options.xhtml {
            data.tag_name.to_ascii_uppercase()
        } else {
            data.tag_name.clone()
        }
    }

    fn attribute(&self, attr: &Attribute) -> String {
        let name = if self.options.uppercase_attributes && !self.options.xhtml {
            attr.name.to_ascii_uppercase()
        } else {
            attr.name.clone()
        };
        if attr.value.is_empty() && attr.is_boolean() {
            return if self.options.xhtml {
                format!("{name}=\"{}\"", attr.name)
            } else {
                name
            };
        }
        format!("{name}=\"{}\"", escape_attribute(&attr.value, &self.options))
    }
}

/// How a block element's content is laid out.
struct BlockLayout {
    /// Children go on lines of their own instead of following the start tag.
    own_lines: bool,
    /// Those lines are one level deeper.
    indented: bool,
}

/// True if the printer puts the element on a line of its own.
fn starts_line(model: ContentModel) -> bool {
    model.is_block() || model.category == Category::RawText
}

/// Elements whose content the tokenizer reads as raw text, so it must not be
/// escaped on the way out.
const fn is_raw_text(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::Script
            | TagId::Style
            | TagId::Xmp
            | TagId::Iframe
            | TagId::Noembed
            | TagId::Noframes
            | TagId::Plaintext
    )
}

/// Elements that swallow one newline directly after their start tag.
const fn keeps_leading_newline(tag: TagId) -> bool {
    matches!(tag, TagId::Pre | TagId::Listing | TagId::Textarea)
}

/// Source form of the non-element, non-text nodes.
fn markup(node: &NodeType) -> String {
    match node {
        NodeType::Doctype {
            name,
            public_id,
            system_id,
        } => {
            let mut text = String::from("<!DOCTYPE");
            if !name.is_empty() {
                text.push(' ');
                text.push_str(name);
            }
            match (public_id, system_id) {
                (Some(public), Some(system)) => {
                    text.push_str(&format!(" PUBLIC \"{public}\" \"{system}\""));
                }
                (Some(public), None) => text.push_str(&format!(" PUBLIC \"{public}\"")),
                (None, Some(system)) => text.push_str(&format!(" SYSTEM \"{system}\"")),
                (None, None) => {}
            }
            text.push('>');
            text
        }
        NodeType::Comment(data) => format!("<!--{data}-->"),
        NodeType::CData(data) => format!("<![CDATA[{data}]]>"),
        NodeType::ProcessingInstruction { target, data } if data.is_empty() => {
            format!("<?{target}?>")
        }
        NodeType::ProcessingInstruction { target, data } => format!("<?{target} {data}?>"),
        NodeType::XmlDeclaration(data) => format!("<?xml {}?>", data.trim()),
        NodeType::Document | NodeType::Element(_) | NodeType::Text(_) => String::new(),
    }
}
