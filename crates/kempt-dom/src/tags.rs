//! The tag dictionary.
//!
//! Every element records, at creation time, which [`TagId`] it is and the
//! [`ContentModel`] that governs how the tree builder nests it and how the
//! printer lays it out. Tags declared by the user through the `new-*-tags`
//! options resolve to [`TagId::Custom`] with the model their declaration
//! asked for; anything else unrecognized is [`TagId::Unknown`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use strum_macros::{EnumString, IntoStaticStr};

/// Known HTML elements, plus the two catch-alls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum TagId {
    A,
    Abbr,
    Acronym,
    Address,
    Applet,
    Area,
    Article,
    Aside,
    Audio,
    B,
    Base,
    Basefont,
    Bdi,
    Bdo,
    Big,
    Blockquote,
    Body,
    Br,
    Button,
    Canvas,
    Caption,
    Center,
    Cite,
    Code,
    Col,
    Colgroup,
    Data,
    Datalist,
    Dd,
    Del,
    Details,
    Dfn,
    Dialog,
    Dir,
    Div,
    Dl,
    Dt,
    Em,
    Embed,
    Fieldset,
    Figcaption,
    Figure,
    Font,
    Footer,
    Form,
    Frame,
    Frameset,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Head,
    Header,
    Hgroup,
    Hr,
    Html,
    I,
    Iframe,
    Img,
    Input,
    Ins,
    Kbd,
    Label,
    Legend,
    Li,
    Link,
    Listing,
    Main,
    Map,
    Mark,
    Math,
    Menu,
    Meta,
    Meter,
    Nav,
    Nobr,
    Noembed,
    Noframes,
    Noscript,
    Object,
    Ol,
    Optgroup,
    Option,
    Output,
    P,
    Param,
    Picture,
    Plaintext,
    Pre,
    Progress,
    Q,
    Rb,
    Rp,
    Rt,
    Rtc,
    Ruby,
    S,
    Samp,
    Script,
    Search,
    Section,
    Select,
    Slot,
    Small,
    Source,
    Span,
    Strike,
    Strong,
    Style,
    Sub,
    Summary,
    Sup,
    Svg,
    Table,
    Tbody,
    Td,
    Template,
    Textarea,
    Tfoot,
    Th,
    Thead,
    Time,
    Title,
    Tr,
    Track,
    Tt,
    U,
    Ul,
    Var,
    Video,
    Wbr,
    Xmp,
    /// Declared through one of the `new-*-tags` options.
    #[strum(disabled)]
    Custom,
    /// Not recognized at all.
    #[strum(disabled)]
    Unknown,
}

/// Broad layout and nesting class of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `html`, `head`, `body`, `frameset`.
    Structure,
    /// Elements that belong in `head`: `title`, `meta`, `link`, `base`.
    Metadata,
    /// Generic block containers.
    Block,
    /// `h1` to `h6`.
    Heading,
    /// `p`, which may only hold phrasing content.
    Paragraph,
    /// `ul`, `ol`, `menu`, `dir`, `dl`.
    List,
    /// `li`, `dt`, `dd`.
    ListItem,
    /// `pre`, `listing`, `plaintext`, `xmp`: whitespace is significant.
    Preformatted,
    /// Phrasing content.
    Inline,
    /// `script`, `style`: content is not markup.
    RawText,
    /// `table`.
    Table,
    /// `caption`, `colgroup`, `col`.
    TableCaption,
    /// `thead`, `tbody`, `tfoot`.
    TableSection,
    /// `tr`.
    TableRow,
    /// `td`, `th`.
    TableCell,
    /// `select`, `datalist`, `optgroup`, `option`.
    Select,
}

/// The rules that govern one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentModel {
    /// Nesting and layout class.
    pub category: Category,
    /// Never has content; printed without an end tag.
    pub void: bool,
    /// The end tag may be omitted without a warning.
    pub optional_end: bool,
    /// Whitespace inside is significant and printed verbatim.
    pub preformatted: bool,
}

impl ContentModel {
    const fn of(category: Category) -> Self {
        Self {
            category,
            void: false,
            optional_end: false,
            preformatted: false,
        }
    }

    const fn void(mut self) -> Self {
        self.void = true;
        self
    }

    const fn optional_end(mut self) -> Self {
        self.optional_end = true;
        self
    }

    const fn preformatted(mut self) -> Self {
        self.preformatted = true;
        self
    }

    /// The model given to unrecognized elements: inline, with a required end tag.
    pub const UNKNOWN: Self = Self::of(Category::Inline);

    /// True if the printer starts this element on its own line.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        !matches!(
            self.category,
            Category::Inline | Category::RawText | Category::Select
        )
    }

    /// True for table structure other than cells.
    #[must_use]
    pub const fn is_table_part(&self) -> bool {
        matches!(
            self.category,
            Category::Table | Category::TableSection | Category::TableRow | Category::TableCaption
        )
    }
}

impl TagId {
    /// Look up a built-in tag by name, case-insensitively.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// The lowercase tag name. Empty for the catch-all variants.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Custom | Self::Unknown => "",
            known => known.into(),
        }
    }

    /// True for `h1` to `h6`.
    #[must_use]
    pub const fn is_heading(self) -> bool {
        matches!(
            self,
            Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6
        )
    }

    /// The content model of a built-in element.
    #[must_use]
    pub const fn model(self) -> ContentModel {
        use Category::{
            Block, Heading, Inline, List, ListItem, Metadata, Paragraph, Preformatted, RawText,
            Select, Structure, Table, TableCaption, TableCell, TableRow, TableSection,
        };
        match self {
            Self::Html | Self::Head | Self::Body => ContentModel::of(Structure).optional_end(),
            Self::Frameset => ContentModel::of(Structure),
            Self::Title => ContentModel::of(Metadata),
            Self::Meta | Self::Link | Self::Base => ContentModel::of(Metadata).void(),
            Self::Script | Self::Style => ContentModel::of(RawText),
            Self::Address
            | Self::Article
            | Self::Aside
            | Self::Blockquote
            | Self::Center
            | Self::Details
            | Self::Dialog
            | Self::Div
            | Self::Fieldset
            | Self::Figcaption
            | Self::Figure
            | Self::Footer
            | Self::Form
            | Self::Header
            | Self::Hgroup
            | Self::Legend
            | Self::Main
            | Self::Nav
            | Self::Noframes
            | Self::Noscript
            | Self::Search
            | Self::Section
            | Self::Summary
            | Self::Template => ContentModel::of(Block),
            Self::Frame => ContentModel::of(Block).void(),
            Self::Hr => ContentModel::of(Block).void(),
            Self::H1 | Self::H2 | Self::H3 | Self::H4 | Self::H5 | Self::H6 => {
                ContentModel::of(Heading)
            }
            Self::P => ContentModel::of(Paragraph).optional_end(),
            Self::Ul | Self::Ol | Self::Menu | Self::Dir | Self::Dl => ContentModel::of(List),
            Self::Li | Self::Dt | Self::Dd => ContentModel::of(ListItem).optional_end(),
            Self::Pre | Self::Listing | Self::Xmp | Self::Plaintext => {
                ContentModel::of(Preformatted).preformatted()
            }
            Self::Textarea => ContentModel::of(Inline).preformatted(),
            Self::Table => ContentModel::of(Table),
            Self::Caption => ContentModel::of(TableCaption).optional_end(),
            Self::Colgroup => ContentModel::of(TableCaption).optional_end(),
            Self::Col => ContentModel::of(TableCaption).void(),
            Self::Thead | Self::Tbody | Self::Tfoot => {
                ContentModel::of(TableSection).optional_end()
            }
            Self::Tr => ContentModel::of(TableRow).optional_end(),
            Self::Td | Self::Th => ContentModel::of(TableCell).optional_end(),
            Self::Select | Self::Datalist => ContentModel::of(Select),
            Self::Optgroup | Self::Option => ContentModel::of(Select).optional_end(),
            Self::Rb | Self::Rp | Self::Rt | Self::Rtc => ContentModel::of(Inline).optional_end(),
            Self::Area
            | Self::Basefont
            | Self::Br
            | Self::Embed
            | Self::Img
            | Self::Input
            | Self::Param
            | Self::Source
            | Self::Track
            | Self::Wbr => ContentModel::of(Inline).void(),
            Self::A
            | Self::Abbr
            | Self::Acronym
            | Self::Applet
            | Self::Audio
            | Self::B
            | Self::Bdi
            | Self::Bdo
            | Self::Big
            | Self::Button
            | Self::Canvas
            | Self::Cite
            | Self::Code
            | Self::Data
            | Self::Del
            | Self::Dfn
            | Self::Em
            | Self::Font
            | Self::I
            | Self::Iframe
            | Self::Ins
            | Self::Kbd
            | Self::Label
            | Self::Map
            | Self::Mark
            | Self::Math
            | Self::Meter
            | Self::Nobr
            | Self::Noembed
            | Self::Object
            | Self::Output
            | Self::Picture
            | Self::Progress
            | Self::Q
            | Self::Ruby
            | Self::S
            | Self::Samp
            | Self::Slot
            | Self::Small
            | Self::Span
            | Self::Strike
            | Self::Strong
            | Self::Sub
            | Self::Sup
            | Self::Svg
            | Self::Time
            | Self::Tt
            | Self::U
            | Self::Var
            | Self::Video
            | Self::Custom
            | Self::Unknown => ContentModel::of(Inline),
        }
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a user-declared tag behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomKind {
    /// From `new-blocklevel-tags`.
    Block,
    /// From `new-inline-tags`.
    Inline,
    /// From `new-empty-tags`.
    Empty,
    /// From `new-pre-tags`.
    Pre,
}

impl CustomKind {
    /// The content model a tag declared this way receives.
    #[must_use]
    pub const fn model(self) -> ContentModel {
        match self {
            Self::Block => ContentModel::of(Category::Block),
            Self::Inline => ContentModel::of(Category::Inline),
            Self::Empty => ContentModel::of(Category::Inline).void(),
            Self::Pre => ContentModel::of(Category::Preformatted).preformatted(),
        }
    }
}

/// Resolves tag names to ids and models, including user declarations.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    custom: HashMap<String, CustomKind>,
}

impl TagTable {
    /// A table with only the built-in tags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as a custom tag. Built-in names cannot be redeclared;
    /// a later declaration of the same custom name wins.
    pub fn declare(&mut self, name: &str, kind: CustomKind) {
        if TagId::lookup(name).is_none() {
            let _ = self.custom.insert(name.to_ascii_lowercase(), kind);
        }
    }

    /// Resolve a tag name. Returns `None` for names that are neither built in
    /// nor declared.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(TagId, ContentModel)> {
        if let Some(tag) = TagId::lookup(name) {
            return Some((tag, tag.model()));
        }
        self.custom
            .get(&name.to_ascii_lowercase())
            .map(|kind| (TagId::Custom, kind.model()))
    }

    /// Resolve a tag name, falling back to [`TagId::Unknown`].
    #[must_use]
    pub fn resolve_or_unknown(&self, name: &str) -> (TagId, ContentModel) {
        self.resolve(name)
            .unwrap_or((TagId::Unknown, ContentModel::UNKNOWN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        assert_eq!(TagId::lookup("TBODY"), Some(TagId::Tbody));
        assert_eq!(TagId::Tbody.name(), "tbody");
        assert_eq!(TagId::H3.name(), "h3");
        assert_eq!(TagId::lookup("custom"), None);
        assert_eq!(TagId::lookup("unknown"), None);
    }

    #[test]
    fn custom_tags_take_their_declared_model() {
        let mut table = TagTable::new();
        table.declare("x-card", CustomKind::Block);
        table.declare("x-icon", CustomKind::Empty);
        let (tag, model) = table.resolve("X-Card").unwrap();
        assert_eq!(tag, TagId::Custom);
        assert!(model.is_block());
        assert!(table.resolve("x-icon").unwrap().1.void);
        assert_eq!(table.resolve("x-other"), None);
    }

    #[test]
    fn built_in_names_cannot_be_redeclared() {
        let mut table = TagTable::new();
        table.declare("p", CustomKind::Empty);
        assert_eq!(table.resolve("p").map(|(t, _)| t), Some(TagId::P));
        assert!(!table.resolve("p").unwrap().1.void);
    }
}
