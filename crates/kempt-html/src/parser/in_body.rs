//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
//!
//! Table structure is repaired here too. Instead of switching into the
//! table insertion modes, each token looks at the content model of the
//! current node: a `table`, section or row accepts only table parts, and
//! everything else is foster-parented in front of the table.

use kempt_common::MessageCode;
use kempt_dom::{Category, ContentModel, TagId};

use super::core::{InsertionMode, Scope, TreeBuilder};
use crate::tokenizer::{Attribute, Token};

impl TreeBuilder<'_> {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } => self.insert_body_character(*data),

            // "Insert a comment."
            Token::Comment { .. } | Token::CData { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_other_node(token);
            }

            // "A DOCTYPE token": "Parse error. Ignore the token."
            Token::Doctype { .. } => self.discard_unexpected("<!DOCTYPE>".to_owned()),
            Token::XmlDeclaration { .. } => self.discard_unexpected("<?xml?>".to_owned()),

            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                // Anything opened while a table, section or row is current
                // goes in front of the table.
                self.foster_parenting = true;
                self.handle_in_body_start_tag(name, *self_closing, attributes);
                self.foster_parenting = false;
            }

            Token::EndTag { name, .. } => self.handle_in_body_end_tag(name),

            // "An end-of-file token": "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),
        }
    }

    /// Character tokens in body. Text has no place directly inside lists and
    /// table structure, so those get an implicit item or are moved out.
    fn insert_body_character(&mut self, c: char) {
        let whitespace = Self::is_whitespace(c);
        let Some(current) = self.current_element() else {
            return;
        };
        let (tag, category) = (current.tag, current.model.category);

        match category {
            Category::Table | Category::TableSection | Category::TableRow => {
                if whitespace {
                    return;
                }
                if !self.text_run_reported {
                    let name = self.current_tag_name();
                    self.report(MessageCode::TextNotAllowedIn, vec![name]);
                    self.text_run_reported = true;
                }
                self.foster_parenting = true;
                self.insert_character(c);
                self.foster_parenting = false;
                return;
            }
            Category::List => {
                if whitespace {
                    return;
                }
                let item = if tag == TagId::Dl { TagId::Dd } else { TagId::Li };
                let _ = self.insert_implicit_element(item);
            }
            Category::Structure
                if tag == TagId::Body && self.options.enclose_text && !whitespace =>
            {
                let _ = self.insert_implicit_element(TagId::P);
            }
            _ => {}
        }
        self.insert_character(c);
    }

    fn current_tag_name(&self) -> String {
        self.current_element()
            .map(|e| e.tag_name.clone())
            .unwrap_or_default()
    }

    fn handle_in_body_start_tag(&mut self, name: &str, self_closing: bool, attributes: &[Attribute]) {
        let Some((tag, model)) = self.options.tags.resolve(name) else {
            // Unknown elements are dropped together with their end tag. Their
            // content stays in place.
            self.report(MessageCode::UnknownElement, vec![name.to_owned()]);
            let _ = self.unknown_tags.insert(name.to_owned());
            return;
        };
        let before = format!("<{name}>");

        match tag {
            // "A start tag whose tag name is "html"": "Parse error. ... add the
            // attribute and its corresponding value to that element."
            TagId::Html => {
                self.discard_unexpected(before);
                if let Some(&html_id) = self.stack_of_open_elements.first() {
                    self.merge_attributes(html_id, attributes);
                }
            }
            TagId::Body => {
                self.discard_unexpected(before);
                if let Some(body_id) = self.body_element_pointer {
                    self.merge_attributes(body_id, attributes);
                }
            }
            TagId::Head | TagId::Frameset => self.discard_unexpected(before),

            TagId::Title | TagId::Meta | TagId::Link | TagId::Base => {
                self.relocate_to_head(name, self_closing, attributes);
            }

            TagId::Table => {
                // A table cannot hold a table directly; the open one ends here.
                if self.current_is_table_context() {
                    let _ = self.close_table(&before, true);
                }
                self.close_p_element(&before);
                self.insert_start_tag(name, self_closing, attributes);
            }

            TagId::Caption
            | TagId::Colgroup
            | TagId::Col
            | TagId::Thead
            | TagId::Tbody
            | TagId::Tfoot
            | TagId::Tr
            | TagId::Td
            | TagId::Th => self.handle_table_part_start_tag(tag, name, self_closing, attributes),

            // "A start tag whose tag name is "li""
            TagId::Li => {
                self.close_list_item(&[TagId::Li], &before);
                self.close_p_element(&before);
                self.ensure_list_parent(TagId::Li);
                self.insert_start_tag(name, self_closing, attributes);
            }
            // "A start tag whose tag name is one of: "dd", "dt""
            TagId::Dd | TagId::Dt => {
                self.close_list_item(&[TagId::Dd, TagId::Dt], &before);
                self.close_p_element(&before);
                self.ensure_list_parent(tag);
                self.insert_start_tag(name, self_closing, attributes);
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            TagId::Option | TagId::Optgroup => {
                if self.current_tag() == Some(TagId::Option) {
                    let _ = self.pop_current();
                }
                if tag == TagId::Optgroup && self.current_tag() == Some(TagId::Optgroup) {
                    let _ = self.pop_current();
                }
                self.insert_start_tag(name, self_closing, attributes);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            heading if heading.is_heading() => {
                self.close_p_element(&before);
                if let Some(index) = self.find_in_scope(Scope::Default, |e| e.tag.is_heading()) {
                    self.pop_above(index, &before);
                    self.pop_reporting(&before);
                }
                self.insert_start_tag(name, self_closing, attributes);
            }

            _ => {
                if closes_p(tag, model) {
                    self.close_p_element(&before);
                }
                if model.category == Category::RawText {
                    self.foster_parenting = false;
                } else if self.current_is_table_context() {
                    let parent = self.current_tag_name();
                    self.report(MessageCode::TagNotAllowedIn, vec![name.to_owned(), parent]);
                }
                self.insert_start_tag(name, self_closing, attributes);
            }
        }
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    /// followed by the void, self-closing and raw text handling.
    fn insert_start_tag(&mut self, name: &str, self_closing: bool, attributes: &[Attribute]) {
        let element_id = self.insert_html_element(name, attributes);
        self.finish_start_tag(element_id, self_closing);
    }

    /// Metadata found in body is moved to the end of `head`.
    fn relocate_to_head(&mut self, name: &str, self_closing: bool, attributes: &[Attribute]) {
        self.report(
            MessageCode::TagNotAllowedIn,
            vec![name.to_owned(), "body".to_owned()],
        );
        let Some(head_id) = self.head_element_pointer else {
            self.insert_start_tag(name, self_closing, attributes);
            return;
        };
        let element_id = self.create_element(name, attributes);
        self.tree.append_child(head_id, element_id);
        self.stack_of_open_elements.push(element_id);
        self.finish_start_tag(element_id, self_closing);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element." Unlike other optional end tags, an implied `</p>`
    /// is always reported.
    fn close_p_element(&mut self, before: &str) {
        if let Some(index) = self.find_in_scope(Scope::Button, |e| e.tag == TagId::P) {
            self.pop_above(index, before);
            self.pop_reporting(before);
        }
    }

    /// The list item loop shared by `li`, `dd` and `dt`:
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "Loop: If node is an li element, then ... Pop elements from
    ///          the stack of open elements until an li element has been
    ///          popped from the stack."
    /// STEP 3: "If node is in the special category, but is not an address,
    ///          div, or p element, then jump to the step labeled done below."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to the step labeled loop."
    fn close_list_item(&mut self, items: &[TagId], before: &str) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let id = self.stack_of_open_elements[index];
            let Some(data) = self.tree.as_element(id) else {
                continue;
            };
            if items.contains(&data.tag) {
                self.pop_above(index, before);
                let _ = self.pop_current();
                return;
            }
            if data.model.is_block() && !matches!(data.tag, TagId::Address | TagId::Div | TagId::P)
            {
                return;
            }
        }
    }

    /// A list item outside a list gets an implicit `ul` (or `dl`) around it.
    fn ensure_list_parent(&mut self, item: TagId) {
        let (accepted, list): (&[TagId], TagId) = if item == TagId::Li {
            (&[TagId::Ul, TagId::Ol, TagId::Menu, TagId::Dir], TagId::Ul)
        } else {
            (&[TagId::Dl], TagId::Dl)
        };
        if self.current_tag().is_some_and(|tag| accepted.contains(&tag)) {
            return;
        }
        let _ = self.open_implicit_element(list);
        self.report(
            MessageCode::MissingParent,
            vec![list.name().to_owned(), item.name().to_owned()],
        );
    }

    /// Close the innermost open `table`, reporting whatever was left open
    /// inside it. With `report_table`, the table's own end tag is reported
    /// as missing.
    fn close_table(&mut self, before: &str, report_table: bool) -> bool {
        let Some(index) = self.find_in_scope(Scope::Table, |e| e.tag == TagId::Table) else {
            return false;
        };
        self.pop_above(index, before);
        if report_table {
            self.pop_reporting(before);
        } else {
            let _ = self.pop_current();
        }
        true
    }

    /// Start tags for table structure. Without an open table they are
    /// meaningless and dropped; otherwise the stack is cleared back to the
    /// right context and missing sections and rows are supplied.
    fn handle_table_part_start_tag(
        &mut self,
        tag: TagId,
        name: &str,
        self_closing: bool,
        attributes: &[Attribute],
    ) {
        let before = format!("<{name}>");
        let Some(table_index) = self.find_in_scope(Scope::Table, |e| e.tag == TagId::Table) else {
            self.discard_unexpected(before);
            return;
        };
        // Table parts, implied sections and rows included, are never
        // foster-parented.
        self.foster_parenting = false;

        match tag {
            // [§ 13.2.6.4.9 "in table"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
            // "Clear the stack back to a table context."
            TagId::Caption | TagId::Colgroup | TagId::Thead | TagId::Tbody | TagId::Tfoot => {
                self.pop_above(table_index, &before);
            }
            TagId::Col => {
                if self.current_tag() != Some(TagId::Colgroup) {
                    self.pop_above(table_index, &before);
                }
            }
            // [§ 13.2.6.4.13 "in table body"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
            // "Clear the stack back to a table body context."
            TagId::Tr => {
                let context = self.innermost_open(table_index, |tag| {
                    matches!(tag, TagId::Tbody | TagId::Thead | TagId::Tfoot | TagId::Table)
                });
                self.pop_above(context, &before);
                if self.current_tag() == Some(TagId::Table) {
                    let _ = self.insert_implicit_element(TagId::Tbody);
                }
            }
            // [§ 13.2.6.4.14 "in row"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
            // "Clear the stack back to a table row context." An open cell is
            // closed on the way.
            _ => {
                let context = self.innermost_open(table_index, |tag| {
                    matches!(
                        tag,
                        TagId::Tr | TagId::Tbody | TagId::Thead | TagId::Tfoot | TagId::Table
                    )
                });
                self.pop_above(context, &before);
                if self.current_tag() == Some(TagId::Table) {
                    let _ = self.insert_implicit_element(TagId::Tbody);
                }
                if matches!(
                    self.current_tag(),
                    Some(TagId::Tbody | TagId::Thead | TagId::Tfoot)
                ) {
                    let _ = self.insert_implicit_element(TagId::Tr);
                }
            }
        }

        self.insert_start_tag(name, self_closing, attributes);
    }

    /// Stack index of the innermost element at or above `floor` matching
    /// `is_context`. Falls back to `floor`.
    fn innermost_open(&self, floor: usize, is_context: impl Fn(TagId) -> bool) -> usize {
        (floor..self.stack_of_open_elements.len())
            .rev()
            .find(|&index| {
                self.tree
                    .tag(self.stack_of_open_elements[index])
                    .is_some_and(&is_context)
            })
            .unwrap_or(floor)
    }

    fn handle_in_body_end_tag(&mut self, name: &str) {
        let before = format!("</{name}>");
        let Some((tag, model)) = self.options.tags.resolve(name) else {
            if !self.unknown_tags.contains(name) {
                self.discard_unexpected(before);
            }
            return;
        };

        match tag {
            // "An end tag whose tag name is "body"": "If the stack of open
            // elements does not have a body element in scope, this is a parse
            // error; ignore the token." "Switch the insertion mode to "after
            // body"."
            TagId::Body | TagId::Html => {
                if !self.has_element_in_scope(TagId::Body) {
                    self.discard_unexpected(before);
                    return;
                }
                self.insertion_mode = InsertionMode::AfterBody;
                if tag == TagId::Html {
                    // "Reprocess the token."
                    self.handle_after_body_mode(&Token::EndTag {
                        name: name.to_owned(),
                        attributes: Vec::new(),
                    });
                }
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6"": an open heading of another level is closed by it.
            heading if heading.is_heading() => {
                if let Some(index) = self.find_in_scope(Scope::Default, |e| e.tag_name == name) {
                    self.pop_above(index, &before);
                    let _ = self.pop_current();
                } else if let Some(index) =
                    self.find_in_scope(Scope::Default, |e| e.tag.is_heading())
                {
                    let open = self
                        .tree
                        .as_element(self.stack_of_open_elements[index])
                        .map(|e| e.tag_name.clone())
                        .unwrap_or_default();
                    self.pop_above(index, &before);
                    let _ = self.pop_current();
                    self.report(MessageCode::ReplacingUnexpected, vec![before, open]);
                } else {
                    self.discard_unexpected(before);
                }
            }

            TagId::Table => {
                if !self.close_table(&before, false) {
                    self.discard_unexpected(before);
                }
            }

            _ => {
                // "Any other end tag"
                let scope = match tag {
                    TagId::P => Scope::Button,
                    TagId::Li => Scope::ListItem,
                    _ if model.is_table_part() || model.category == Category::TableCell => {
                        Scope::Table
                    }
                    _ => Scope::Default,
                };
                match self.find_in_scope(scope, |e| e.tag_name == name) {
                    Some(index) => {
                        self.pop_above(index, &before);
                        let _ = self.pop_current();
                    }
                    None => self.discard_unexpected(before),
                }
            }
        }
    }
}

/// Start tags that end an open paragraph: "If the stack of open elements has
/// a p element in button scope, then close a p element."
fn closes_p(tag: TagId, model: ContentModel) -> bool {
    match tag {
        TagId::Custom => model.category == Category::Block || model.preformatted,
        _ => matches!(
            tag,
            TagId::Address
                | TagId::Article
                | TagId::Aside
                | TagId::Blockquote
                | TagId::Center
                | TagId::Details
                | TagId::Dialog
                | TagId::Dir
                | TagId::Div
                | TagId::Dl
                | TagId::Fieldset
                | TagId::Figcaption
                | TagId::Figure
                | TagId::Footer
                | TagId::Form
                | TagId::Header
                | TagId::Hgroup
                | TagId::Hr
                | TagId::Listing
                | TagId::Main
                | TagId::Menu
                | TagId::Nav
                | TagId::Ol
                | TagId::P
                | TagId::Plaintext
                | TagId::Pre
                | TagId::Search
                | TagId::Section
                | TagId::Summary
                | TagId::Ul
                | TagId::Xmp
        ),
    }
}
