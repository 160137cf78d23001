use std::collections::HashSet;
use std::fmt::Write as _;

use kempt_common::{MessageCode, MessageLog, SourcePos};
use kempt_config::{BadCharRefs, DetectedDoctype, OptionId, OptionStore};
use kempt_dom::{
    Attribute as DomAttribute, Category, CustomKind, DomTree, ElementData, NodeId, NodeType,
    TagId, TagTable,
};
use strum_macros::Display;

use crate::tokenizer::{Attribute, HtmlTokenizer, Token, TokenizerOptions};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// Table content is handled inside "in body" through the content model of the
/// current node, so the table modes of § 13.2.6.4.9 - § 13.2.6.4.15 have no
/// variant of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
}

/// Settings the tree builder takes from the option store.
#[derive(Debug, Clone, Default)]
pub struct BuilderOptions {
    /// Passed through to the tokenizer.
    pub tokenizer: TokenizerOptions,
    /// Built-in tags plus the `new-*-tags` declarations.
    pub tags: TagTable,
    /// Wrap text found directly in `body` in a `p`.
    pub enclose_text: bool,
    /// Stop after this many errors. Zero means no limit.
    pub error_limit: usize,
}

impl BuilderOptions {
    /// Read the markup options that influence tree construction.
    #[must_use]
    pub fn from_store(options: &OptionStore) -> Self {
        let mut tags = TagTable::new();
        for (id, kind) in [
            (OptionId::NewBlocklevelTags, CustomKind::Block),
            (OptionId::NewInlineTags, CustomKind::Inline),
            (OptionId::NewEmptyTags, CustomKind::Empty),
            (OptionId::NewPreTags, CustomKind::Pre),
        ] {
            for name in options.get_list(id) {
                tags.declare(name, kind);
            }
        }
        Self {
            tokenizer: TokenizerOptions {
                bad_char_refs: options.get_choice::<BadCharRefs>(OptionId::BadCharRefs),
            },
            tags,
            enclose_text: options.get_bool(OptionId::EncloseText),
            error_limit: usize::try_from(options.get_int(OptionId::ErrorLimit))
                .unwrap_or(usize::MAX),
        }
    }
}

/// What tree construction leaves behind besides its messages.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The repaired tree. Always has `html`, `head` and `body` (or
    /// `frameset`).
    pub tree: DomTree,
    /// The error limit stopped the builder before the end of input.
    pub halted: bool,
    /// The source had no `body` start tag.
    pub body_was_implicit: bool,
    /// The kind of doctype the source declared.
    pub doctype: DetectedDoctype,
}

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in button scope"
    Button,
    /// "has an element in list item scope"
    ListItem,
    /// "has an element in table scope"
    Table,
}

impl Scope {
    const fn markers(self) -> &'static [TagId] {
        const DEFAULT: &[TagId] = &[
            TagId::Applet,
            TagId::Caption,
            TagId::Html,
            TagId::Table,
            TagId::Td,
            TagId::Th,
            TagId::Object,
            TagId::Template,
        ];
        const BUTTON: &[TagId] = &[
            TagId::Applet,
            TagId::Caption,
            TagId::Html,
            TagId::Table,
            TagId::Td,
            TagId::Th,
            TagId::Object,
            TagId::Template,
            TagId::Button,
        ];
        const LIST_ITEM: &[TagId] = &[
            TagId::Applet,
            TagId::Caption,
            TagId::Html,
            TagId::Table,
            TagId::Td,
            TagId::Th,
            TagId::Object,
            TagId::Template,
            TagId::Ol,
            TagId::Ul,
        ];
        const TABLE: &[TagId] = &[TagId::Html, TagId::Table, TagId::Template];
        match self {
            Self::Default => DEFAULT,
            Self::Button => BUTTON,
            Self::ListItem => LIST_ITEM,
            Self::Table => TABLE,
        }
    }
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a repaired [`DomTree`] from a lazily tokenized document. Every
/// repair is recorded in the caller's [`MessageLog`], interleaved with the
/// lexer's own messages in source order.
#[allow(clippy::struct_excessive_bools)]
pub struct TreeBuilder<'log> {
    pub(super) tokenizer: HtmlTokenizer,
    pub(super) options: BuilderOptions,
    pub(super) log: &'log mut MessageLog,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.2 The original insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    pub(super) original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    pub(super) stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element_pointer: Option<NodeId>,
    pub(super) body_element_pointer: Option<NodeId>,

    pub(super) tree: DomTree,

    /// Where the token being processed starts.
    pub(super) token_pos: SourcePos,

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// Set after `<pre>`, `<listing>` and `<textarea>`: "If the next token is
    /// a U+000A LINE FEED (LF) character token, then ignore that token".
    pub(super) ignore_next_newline: bool,

    /// A run of misplaced text has already been reported.
    pub(super) text_run_reported: bool,

    /// Names already reported as unknown. Their end tags are dropped quietly.
    pub(super) unknown_tags: HashSet<String>,

    pub(super) doctype: Option<DetectedDoctype>,
    pub(super) body_was_implicit: bool,
    pub(super) halted: bool,
    pub(super) stopped: bool,
}

impl<'log> TreeBuilder<'log> {
    /// Create a builder for `input`, reporting into `log`.
    #[must_use]
    pub fn new(input: &str, options: BuilderOptions, log: &'log mut MessageLog) -> Self {
        Self {
            tokenizer: HtmlTokenizer::new(input, options.tokenizer),
            options,
            log,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            stack_of_open_elements: Vec::new(),
            head_element_pointer: None,
            body_element_pointer: None,
            tree: DomTree::new(),
            token_pos: SourcePos::START,
            foster_parenting: false,
            ignore_next_newline: false,
            text_run_reported: false,
            unknown_tags: HashSet::new(),
            doctype: None,
            body_was_implicit: false,
            halted: false,
            stopped: false,
        }
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// How many elements are open. Zero once [`TreeBuilder::run`] returns.
    #[must_use]
    pub fn open_element_count(&self) -> usize {
        self.stack_of_open_elements.len()
    }

    /// Pull tokens until end of input or until the error limit is reached.
    pub fn run(&mut self) {
        log::debug!("tree construction started");
        while !self.stopped {
            let Some(located) = self.tokenizer.next() else {
                break;
            };
            self.drain_lexer_messages();
            self.token_pos = located.pos;
            let token = located.token;

            if std::mem::take(&mut self.ignore_next_newline)
                && token == Token::new_character('\n')
            {
                continue;
            }
            if !matches!(token, Token::Character { .. }) {
                self.text_run_reported = false;
            }

            self.process_token(&token);

            if !self.stopped && self.error_limit_reached() {
                self.halt();
            }
        }
        if !self.stopped {
            self.stop_parsing();
        }
        self.drain_lexer_messages();
        log::debug!(
            "tree construction finished: {} nodes, halted={}",
            self.tree.len(),
            self.halted
        );
    }

    /// Give up the builder and keep what it built.
    #[must_use]
    pub fn into_outcome(self) -> ParseOutcome {
        ParseOutcome {
            tree: self.tree,
            halted: self.halted,
            body_was_implicit: self.body_was_implicit,
            doctype: self.doctype.unwrap_or_default(),
        }
    }

    fn drain_lexer_messages(&mut self) {
        for message in self.tokenizer.take_messages() {
            self.log.push(message);
        }
    }

    fn error_limit_reached(&self) -> bool {
        self.options.error_limit > 0 && self.log.error_count() >= self.options.error_limit
    }

    /// Stop consuming tokens. The stack is closed without further messages.
    fn halt(&mut self) {
        let limit = self.options.error_limit;
        log::debug!("error limit of {limit} reached at {}", self.token_pos);
        self.report(MessageCode::ErrorLimitReached, vec![limit.to_string()]);
        self.stack_of_open_elements.clear();
        self.ensure_document_structure(false);
        self.halted = true;
        self.stopped = true;
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    pub(super) fn process_token(&mut self, token: &Token) {
        log::trace!("{} <- {token}", self.insertion_mode);
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
        }
    }

    /// "Reprocess the token"
    pub(super) fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    pub(super) const fn is_whitespace(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
    }

    pub(super) fn report(&mut self, code: MessageCode, args: Vec<String>) {
        let _ = self.log.report(code, Some(self.token_pos), args);
    }

    pub(super) fn discard_unexpected(&mut self, what: String) {
        self.report(MessageCode::DiscardingUnexpected, vec![what]);
    }
}

// ===== Stack of open elements =====

impl TreeBuilder<'_> {
    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    pub(super) fn current_element(&self) -> Option<&ElementData> {
        self.current_node().and_then(|id| self.tree.as_element(id))
    }

    pub(super) fn current_tag(&self) -> Option<TagId> {
        self.current_element().map(|e| e.tag)
    }

    /// True while the current node is a `table`, a table section or a row,
    /// none of which may hold text or flow content.
    pub(super) fn current_is_table_context(&self) -> bool {
        self.current_element().is_some_and(|e| {
            matches!(
                e.model.category,
                Category::Table | Category::TableSection | Category::TableRow
            )
        })
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    ///
    /// Returns the stack index of the match.
    pub(super) fn find_in_scope(
        &self,
        scope: Scope,
        is_target: impl Fn(&ElementData) -> bool,
    ) -> Option<usize> {
        for (index, &id) in self.stack_of_open_elements.iter().enumerate().rev() {
            let Some(data) = self.tree.as_element(id) else {
                continue;
            };
            if is_target(data) {
                return Some(index);
            }
            if scope.markers().contains(&data.tag) {
                return None;
            }
        }
        None
    }

    pub(super) fn has_element_in_scope(&self, tag: TagId) -> bool {
        self.find_in_scope(Scope::Default, |e| e.tag == tag).is_some()
    }

    /// Pop the current node without a message.
    pub(super) fn pop_current(&mut self) -> Option<NodeId> {
        self.stack_of_open_elements.pop()
    }

    /// Pop every element above stack index `index`. Each element whose end
    /// tag is required is reported as missing before `before`.
    pub(super) fn pop_above(&mut self, index: usize, before: &str) {
        while self.stack_of_open_elements.len() > index + 1 {
            let Some(id) = self.pop_current() else {
                return;
            };
            let Some(data) = self.tree.as_element(id) else {
                continue;
            };
            if !(data.implicit || data.model.optional_end) {
                let name = data.tag_name.clone();
                self.report(
                    MessageCode::MissingEndtagBefore,
                    vec![name, before.to_owned()],
                );
            }
        }
    }

    /// Pop the current node and report its end tag as missing before `before`.
    pub(super) fn pop_reporting(&mut self, before: &str) {
        if let Some(id) = self.pop_current()
            && let Some(data) = self.tree.as_element(id)
        {
            let name = data.tag_name.clone();
            self.report(
                MessageCode::MissingEndtagBefore,
                vec![name, before.to_owned()],
            );
        }
    }
}

// ===== Creating and inserting nodes =====

impl TreeBuilder<'_> {
    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// Returns `(parent_id, Option<before_id>)`. When `before_id` is `Some`,
    /// the node goes immediately before it.
    fn foster_parent_location(&self) -> (NodeId, Option<NodeId>) {
        // STEP 1: "Let last table be the last table element in the stack of
        //          open elements, if any."
        let last_table = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.tree.is_tag(id, TagId::Table));

        if let Some(table_pos) = last_table {
            let table_id = self.stack_of_open_elements[table_pos];
            // STEP 2: "If last table has a parent node, then let adjusted
            //          insertion location be before last table in its parent
            //          node."
            if let Some(parent_id) = self.tree.parent(table_id) {
                return (parent_id, Some(table_id));
            }
            // "Otherwise, let adjusted insertion location be inside the
            //  element immediately above last table in the stack of open
            //  elements."
            if let Some(&above) = table_pos
                .checked_sub(1)
                .and_then(|i| self.stack_of_open_elements.get(i))
            {
                return (above, None);
            }
        }
        // STEP 3: "...the adjusted insertion location is inside the first
        //          element in the stack of open elements (the html element)."
        let first = self
            .stack_of_open_elements
            .first()
            .copied()
            .unwrap_or(NodeId::ROOT);
        (first, None)
    }

    /// [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node."
    pub(super) fn adjusted_insertion_location(&self) -> (NodeId, Option<NodeId>) {
        let target = self.current_node().unwrap_or(NodeId::ROOT);
        if self.foster_parenting && self.current_is_table_context() {
            return self.foster_parent_location();
        }
        (target, None)
    }

    fn insert_at_adjusted_location(&mut self, node: NodeId) {
        match self.adjusted_insertion_location() {
            (parent, Some(reference)) => self.tree.insert_before(parent, node, reference),
            (parent, None) => self.tree.append_child(parent, node),
        }
    }

    /// [§ 13.2.6.1 Create an element for the token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// The tag is resolved once here; user-declared tags get their declared
    /// content model.
    pub(super) fn create_element(&mut self, name: &str, attributes: &[Attribute]) -> NodeId {
        let (tag, model) = self.options.tags.resolve_or_unknown(name);
        let mut data = ElementData::new(name, tag, model);
        data.attrs = attributes
            .iter()
            .map(|attr| DomAttribute::new(attr.name.as_str(), attr.value.as_str()))
            .collect();
        self.tree.alloc_at(NodeType::Element(data), self.token_pos)
    }

    /// An element the source did not contain.
    fn create_implicit_element(&mut self, tag: TagId) -> NodeId {
        let mut data = ElementData::builtin(tag);
        data.implicit = true;
        self.tree.alloc_at(NodeType::Element(data), self.token_pos)
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    pub(super) fn insert_html_element(&mut self, name: &str, attributes: &[Attribute]) -> NodeId {
        // STEP 1: "Create an element for the token"
        let element_id = self.create_element(name, attributes);
        // STEP 2: "Insert it at the adjusted insertion location."
        self.insert_at_adjusted_location(element_id);
        // STEP 3: "Push the element onto the stack of open elements."
        self.stack_of_open_elements.push(element_id);
        element_id
    }

    /// Insert and open an element the source left out, reporting it with
    /// `INSERTING_TAG`.
    pub(super) fn insert_implicit_element(&mut self, tag: TagId) -> NodeId {
        let element_id = self.open_implicit_element(tag);
        self.report(MessageCode::InsertingTag, vec![tag.name().to_owned()]);
        element_id
    }

    /// Insert and open an element the source left out. The caller reports it.
    pub(super) fn open_implicit_element(&mut self, tag: TagId) -> NodeId {
        log::trace!("inserting implicit <{tag}> at {}", self.token_pos);
        let element_id = self.create_implicit_element(tag);
        self.insert_at_adjusted_location(element_id);
        self.stack_of_open_elements.push(element_id);
        element_id
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    pub(super) fn insert_character(&mut self, c: char) {
        // STEP 1: "Let the adjusted insertion location be the appropriate place
        //         for inserting a node."
        let (parent_id, before_id) = self.adjusted_insertion_location();

        // STEP 2: "If there is a Text node immediately before the adjusted
        //         insertion location, then append data to that Text node's data."
        let adjacent = match before_id {
            Some(reference) => self.tree.prev_sibling(reference),
            None => self.tree.last_child(parent_id),
        };
        if let Some(text_id) = adjacent
            && let Some(node) = self.tree.get_mut(text_id)
            && let NodeType::Text(ref mut text) = node.node_type
        {
            text.push(c);
            return;
        }

        // STEP 3: "Otherwise, create a new Text node whose data is data ...
        //         and insert the newly created node at the adjusted insertion
        //         location."
        let text_id = self
            .tree
            .alloc_at(NodeType::Text(String::from(c)), self.token_pos);
        match before_id {
            Some(reference) => self.tree.insert_before(parent_id, text_id, reference),
            None => self.tree.append_child(parent_id, text_id),
        }
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    pub(super) fn insert_comment(&mut self, data: &str) {
        let comment_id = self
            .tree
            .alloc_at(NodeType::Comment(data.to_owned()), self.token_pos);
        self.insert_at_adjusted_location(comment_id);
    }

    /// Insert a node as the last child of the Document.
    pub(super) fn insert_into_document(&mut self, node_type: NodeType) {
        let id = self.tree.alloc_at(node_type, self.token_pos);
        self.tree.append_child(NodeId::ROOT, id);
    }

    /// Comments, CDATA sections and processing instructions are kept where
    /// they occur.
    pub(super) fn insert_other_node(&mut self, token: &Token) {
        let node_type = match token {
            Token::Comment { data } => NodeType::Comment(data.clone()),
            Token::CData { data } => NodeType::CData(data.clone()),
            Token::ProcessingInstruction { target, data } => NodeType::ProcessingInstruction {
                target: target.clone(),
                data: data.clone(),
            },
            Token::XmlDeclaration { data } => NodeType::XmlDeclaration(data.clone()),
            _ => return,
        };
        let id = self.tree.alloc_at(node_type, self.token_pos);
        self.insert_at_adjusted_location(id);
    }

    /// Copy each attribute the element lacks from a repeated start tag.
    ///
    /// "For each attribute on the token, check to see if the attribute is
    /// already present on the ... element. If it is not, add the attribute
    /// and its corresponding value to that element."
    pub(super) fn merge_attributes(&mut self, target: NodeId, attributes: &[Attribute]) {
        if let Some(data) = self.tree.as_element_mut(target) {
            for attr in attributes {
                if !data.has_attr(&attr.name) {
                    data.attrs
                        .push(DomAttribute::new(attr.name.as_str(), attr.value.as_str()));
                }
            }
        }
    }

    /// Steps shared by every start tag once its element has been inserted
    /// and pushed: void and self-closed elements are closed again, and raw
    /// text elements switch to the "text" insertion mode.
    pub(super) fn finish_start_tag(&mut self, element_id: NodeId, self_closing: bool) {
        let Some(data) = self.tree.as_element(element_id) else {
            return;
        };
        let (tag, name, model) = (data.tag, data.tag_name.clone(), data.model);

        if model.void {
            let _ = self.pop_current();
            return;
        }
        if self_closing {
            self.report(MessageCode::SelfClosingNonVoid, vec![name]);
            let _ = self.pop_current();
            return;
        }
        if switches_tokenizer(&name) {
            // "Let the original insertion mode be the current insertion mode."
            // "Switch the insertion mode to "text"."
            self.original_insertion_mode = Some(self.insertion_mode);
            self.insertion_mode = InsertionMode::Text;
        }
        if matches!(tag, TagId::Pre | TagId::Listing | TagId::Textarea) {
            self.ignore_next_newline = true;
        }
    }
}

/// Elements after whose start tag the tokenizer stops recognizing markup
/// until the matching end tag.
fn switches_tokenizer(name: &str) -> bool {
    matches!(
        name,
        "title" | "textarea" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "script"
    )
}

// ===== Insertion modes before body =====

impl TreeBuilder<'_> {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "Ignore the token."
            Token::Character { data } if Self::is_whitespace(*data) => {}

            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_into_document(NodeType::Comment(data.clone())),
            Token::ProcessingInstruction { .. } | Token::XmlDeclaration { .. } => {
                self.insert_other_node(token);
            }

            // "Append a DocumentType node to the Document node ... Then, switch
            // the insertion mode to "before html"."
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                ..
            } => {
                self.insert_into_document(NodeType::Doctype {
                    name: name.clone().unwrap_or_default(),
                    public_id: public_identifier.clone(),
                    system_id: system_identifier.clone(),
                });
                self.doctype = Some(detect_doctype(
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                ));
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            // "Anything else": "switch the insertion mode to "before html",
            // then reprocess the token."
            _ => {
                self.insertion_mode = InsertionMode::BeforeHtml;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.discard_unexpected("<!DOCTYPE>".to_owned()),
            Token::Comment { data } => self.insert_into_document(NodeType::Comment(data.clone())),
            Token::ProcessingInstruction { .. } | Token::XmlDeclaration { .. } => {
                self.insert_other_node(token);
            }
            Token::Character { data } if Self::is_whitespace(*data) => {}

            // "Create an element for the token ... Append it to the Document
            // object. Put this element in the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let html_id = self.create_element(name, attributes);
                self.tree.append_child(NodeId::ROOT, html_id);
                self.stack_of_open_elements.push(html_id);
                self.insertion_mode = InsertionMode::BeforeHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.handle_before_html_anything_else(token);
            }
            // "Any other end tag": "Parse error. Ignore the token."
            Token::EndTag { name, .. } => self.discard_unexpected(format!("</{name}>")),

            _ => self.handle_before_html_anything_else(token),
        }
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of
    /// open elements. Switch the insertion mode to "before head", then
    /// reprocess the token."
    fn handle_before_html_anything_else(&mut self, token: &Token) {
        let html_id = self.create_implicit_element(TagId::Html);
        self.tree.append_child(NodeId::ROOT, html_id);
        self.stack_of_open_elements.push(html_id);
        self.report(MessageCode::InsertingTag, vec!["html".to_owned()]);
        self.insertion_mode = InsertionMode::BeforeHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {}
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_other_node(token);
            }
            Token::Doctype { .. } => self.discard_unexpected("<!DOCTYPE>".to_owned()),

            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "Insert an HTML element for the token. Set the head element
            // pointer to the newly created head element. Switch the insertion
            // mode to "in head"."
            Token::StartTag {
                name, attributes, ..
            } if name == "head" => {
                let head_id = self.insert_html_element(name, attributes);
                self.head_element_pointer = Some(head_id);
                self.insertion_mode = InsertionMode::InHead;
            }

            Token::EndTag { name, .. }
                if matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.handle_before_head_anything_else(token);
            }
            Token::EndTag { name, .. } => self.discard_unexpected(format!("</{name}>")),

            _ => self.handle_before_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "head" start tag token with no attributes.
    /// Set the head element pointer to the newly created head element.
    /// Switch the insertion mode to "in head". Reprocess the current token."
    fn handle_before_head_anything_else(&mut self, token: &Token) {
        let head_id = self.insert_implicit_element(TagId::Head);
        self.head_element_pointer = Some(head_id);
        self.insertion_mode = InsertionMode::InHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // Whitespace in head carries no content; the printer lays the
            // head out itself.
            Token::Character { data } if Self::is_whitespace(*data) => {}
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_other_node(token);
            }
            Token::Doctype { .. } => self.discard_unexpected("<!DOCTYPE>".to_owned()),

            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta"": "Insert an HTML element for the token.
            // Immediately pop the current node off the stack of open elements."
            //
            // "title", "noframes", "style", "script": the generic RCDATA and
            // raw text algorithms switch to the "text" insertion mode.
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } if matches!(
                name.as_str(),
                "base" | "link" | "meta" | "title" | "style" | "script" | "noframes"
            ) =>
            {
                let element_id = self.insert_html_element(name, attributes);
                self.finish_start_tag(element_id, *self_closing);
            }

            // `noscript` in head may only hold metadata, which this mode
            // already accepts.
            Token::StartTag {
                name, attributes, ..
            } if name == "noscript" => {
                let _ = self.insert_html_element(name, attributes);
            }
            Token::EndTag { name, .. }
                if name == "noscript" && self.current_tag() == Some(TagId::Noscript) =>
            {
                let _ = self.pop_current();
            }

            Token::StartTag { name, .. } if name == "head" => {
                self.discard_unexpected("<head>".to_owned());
            }

            // "An end tag whose tag name is "head"": "Pop the current node
            // (which will be the head element) off the stack of open elements.
            // Switch the insertion mode to "after head"."
            Token::EndTag { name, .. } if name == "head" => {
                self.pop_head("</head>");
                self.insertion_mode = InsertionMode::AfterHead;
            }

            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_in_head_anything_else(token);
            }
            Token::EndTag { name, .. } => self.discard_unexpected(format!("</{name}>")),

            _ => self.handle_in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack
    /// of open elements. Switch the insertion mode to "after head". Reprocess
    /// the token."
    fn handle_in_head_anything_else(&mut self, token: &Token) {
        let before = describe_token(token);
        self.pop_head(&before);
        self.insertion_mode = InsertionMode::AfterHead;
        self.reprocess_token(token);
    }

    /// Close `head` and anything still open inside it.
    fn pop_head(&mut self, before: &str) {
        if let Some(index) = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.tree.is_tag(id, TagId::Head))
        {
            self.pop_above(index, before);
            let _ = self.pop_current();
        }
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {}
            Token::Comment { .. } | Token::ProcessingInstruction { .. } => {
                self.insert_other_node(token);
            }
            Token::Doctype { .. } => self.discard_unexpected("<!DOCTYPE>".to_owned()),

            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "Insert an HTML element for the token. Switch the insertion mode
            // to "in body"."
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                let body_id = self.insert_html_element(name, attributes);
                self.body_element_pointer = Some(body_id);
                self.insertion_mode = InsertionMode::InBody;
            }
            Token::StartTag {
                name, attributes, ..
            } if name == "frameset" => {
                let frameset_id = self.insert_html_element(name, attributes);
                self.body_element_pointer = Some(frameset_id);
                self.insertion_mode = InsertionMode::InBody;
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Push the node pointed to by the head element pointer onto the
            // stack of open elements. Process the token using the rules for the
            // "in head" insertion mode. Remove the node pointed to by the head
            // element pointer from the stack of open elements."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base" | "link" | "meta" | "noframes" | "script" | "style" | "title"
                ) =>
            {
                let Some(head_id) = self.head_element_pointer else {
                    self.handle_after_head_anything_else(token);
                    return;
                };
                self.stack_of_open_elements.push(head_id);
                self.handle_in_head_mode(token);
                self.stack_of_open_elements.retain(|&id| id != head_id);
            }

            Token::StartTag { name, .. } if name == "head" => {
                self.discard_unexpected("<head>".to_owned());
            }
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.handle_after_head_anything_else(token);
            }
            Token::EndTag { name, .. } => self.discard_unexpected(format!("</{name}>")),

            _ => self.handle_after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no
    /// attributes. Switch the insertion mode to "in body". Reprocess the
    /// current token."
    fn handle_after_head_anything_else(&mut self, token: &Token) {
        let body_id = self.insert_implicit_element(TagId::Body);
        self.body_element_pointer = Some(body_id);
        self.body_was_implicit = true;
        self.insertion_mode = InsertionMode::InBody;
        self.reprocess_token(token);
    }
}

// ===== Text, after body and end of input =====

impl TreeBuilder<'_> {
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "Insert the token's character."
            Token::Character { data } => self.insert_character(*data),

            // "An end-of-file token": the element is reported as unclosed
            // along with everything else still open.
            Token::EndOfFile => self.stop_parsing(),

            // "Pop the current node off the stack of open elements. Switch the
            // insertion mode to the original insertion mode."
            _ => {
                let _ = self.pop_current();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
            }
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_body_mode(token);
            }
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let html_id = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                let comment_id = self
                    .tree
                    .alloc_at(NodeType::Comment(data.clone()), self.token_pos);
                self.tree.append_child(html_id, comment_id);
            }
            Token::Doctype { .. } => self.discard_unexpected("<!DOCTYPE>".to_owned()),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::EndTag { name, .. } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterBody;
            }
            Token::EndOfFile => self.stop_parsing(),

            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token." The earlier </body> was premature.
            _ => {
                self.discard_unexpected("</body>".to_owned());
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { data } => self.insert_into_document(NodeType::Comment(data.clone())),
            Token::Doctype { .. } => self.discard_unexpected("<!DOCTYPE>".to_owned()),
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::EndOfFile => self.stop_parsing(),
            _ => {
                self.discard_unexpected("</html>".to_owned());
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements." Elements whose end
    /// tag may be omitted close silently; the rest are reported. Then the
    /// document gets whatever structure it is missing.
    pub(super) fn stop_parsing(&mut self) {
        while let Some(id) = self.pop_current() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if let NodeType::Element(data) = &node.node_type
                && !(data.implicit || data.model.optional_end)
            {
                let (name, pos) = (data.tag_name.clone(), node.pos);
                let _ = self
                    .log
                    .report(MessageCode::MissingEndtagFor, Some(pos), vec![name]);
            }
        }

        self.ensure_document_structure(true);
        self.ensure_title();
        if self.doctype.is_none() {
            let _ = self.log.report(MessageCode::MissingDoctype, None, Vec::new());
        }
        self.stopped = true;
    }

    /// Synthesize `html`, `head` and `body` when the source never produced
    /// them.
    fn ensure_document_structure(&mut self, report: bool) {
        let mut inserted = Vec::new();

        let html_id = if let Some(id) = self.tree.document_element() {
            id
        } else {
            let id = self.create_implicit_element(TagId::Html);
            self.tree.append_child(NodeId::ROOT, id);
            inserted.push(TagId::Html);
            id
        };

        if self.tree.head().is_none() {
            let id = self.create_implicit_element(TagId::Head);
            match self.tree.first_child(html_id) {
                Some(first) => self.tree.insert_before(html_id, id, first),
                None => self.tree.append_child(html_id, id),
            }
            self.head_element_pointer = Some(id);
            inserted.push(TagId::Head);
        }

        if self.tree.body().is_none() {
            let id = self.create_implicit_element(TagId::Body);
            self.tree.append_child(html_id, id);
            self.body_element_pointer = Some(id);
            self.body_was_implicit = true;
            inserted.push(TagId::Body);
        }

        if report {
            for tag in inserted {
                self.report(MessageCode::InsertingTag, vec![tag.name().to_owned()]);
            }
        }
    }

    /// Every document needs a `title`; an empty one is added to `head`.
    fn ensure_title(&mut self) {
        let Some(head_id) = self.tree.head() else {
            return;
        };
        if self.tree.find_first(head_id, TagId::Title).is_some() {
            return;
        }
        let title_id = self.create_implicit_element(TagId::Title);
        self.tree.append_child(head_id, title_id);
        let _ = self
            .log
            .report(MessageCode::MissingTitleElement, None, Vec::new());
    }
}

/// How a token reads in "missing </x> before ..." messages.
pub(super) fn describe_token(token: &Token) -> String {
    match token {
        Token::StartTag { name, .. } => format!("<{name}>"),
        Token::EndTag { name, .. } => format!("</{name}>"),
        Token::Character { .. } => "text".to_owned(),
        Token::EndOfFile => "end of file".to_owned(),
        Token::Comment { .. } => "comment".to_owned(),
        other => other.to_string(),
    }
}

/// Classify a doctype by its name and identifiers.
#[must_use]
pub fn detect_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
) -> DetectedDoctype {
    if !name.is_some_and(|n| n.eq_ignore_ascii_case("html")) {
        return DetectedDoctype::Other;
    }
    let Some(public_id) = public_id else {
        return match system_id {
            None => DetectedDoctype::Html5,
            Some(system) if system.eq_ignore_ascii_case("about:legacy-compat") => {
                DetectedDoctype::Html5
            }
            Some(_) => DetectedDoctype::Other,
        };
    };
    let public_id = public_id.to_ascii_lowercase();
    if public_id.contains("xhtml 1") {
        DetectedDoctype::Xhtml1
    } else if public_id.contains("html 4.01 transitional")
        || public_id.contains("html 4.0 transitional")
    {
        DetectedDoctype::Html4Transitional
    } else if public_id.contains("html 4.01 frameset") || public_id.contains("html 4.0 frameset")
    {
        DetectedDoctype::Html4Frameset
    } else if public_id.contains("html 4.01//") || public_id.contains("html 4.0//") {
        DetectedDoctype::Html4Strict
    } else {
        DetectedDoctype::Other
    }
}

/// Render a tree as an indented outline, one node per line.
#[must_use]
pub fn dump_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, id, 0);
    out
}

fn write_node(out: &mut String, tree: &DomTree, id: NodeId, indent: usize) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}#document"),
        NodeType::Doctype { name, .. } => writeln!(out, "{prefix}<!DOCTYPE {name}>"),
        NodeType::Element(data) => {
            let mut line = format!("{prefix}<{}", data.tag_name);
            for attr in &data.attrs {
                if attr.value.is_empty() {
                    let _ = write!(line, " {}", attr.name);
                } else {
                    let _ = write!(line, " {}=\"{}\"", attr.name, attr.value);
                }
            }
            writeln!(out, "{line}>")
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!--{data}-->"),
        NodeType::CData(data) => writeln!(out, "{prefix}<![CDATA[{data}]]>"),
        NodeType::ProcessingInstruction { target, data } => {
            writeln!(out, "{prefix}<?{target} {data}?>")
        }
        NodeType::XmlDeclaration(data) => writeln!(out, "{prefix}<?xml {data}?>"),
    };
    for &child_id in tree.children(id) {
        write_node(out, tree, child_id, indent + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctype_kinds() {
        assert_eq!(detect_doctype(Some("html"), None, None), DetectedDoctype::Html5);
        assert_eq!(
            detect_doctype(Some("HTML"), Some("-//W3C//DTD HTML 4.01//EN"), None),
            DetectedDoctype::Html4Strict
        );
        assert_eq!(
            detect_doctype(
                Some("html"),
                Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
                None
            ),
            DetectedDoctype::Html4Transitional
        );
        assert_eq!(
            detect_doctype(
                Some("html"),
                Some("-//W3C//DTD XHTML 1.0 Strict//EN"),
                None
            ),
            DetectedDoctype::Xhtml1
        );
        assert_eq!(detect_doctype(Some("svg"), None, None), DetectedDoctype::Other);
    }

    #[test]
    fn tokens_describe_themselves_for_messages() {
        assert_eq!(describe_token(&Token::new_start_tag()), "<>");
        assert_eq!(describe_token(&Token::EndOfFile), "end of file");
    }
}
