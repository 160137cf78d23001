//! Attributes and the attribute dictionary.

use std::str::FromStr;

use strum_macros::{EnumString, IntoStaticStr};

/// Known attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum AttrId {
    Abbr,
    Accept,
    Accesskey,
    Action,
    Align,
    Alt,
    Async,
    Autocomplete,
    Autofocus,
    Bgcolor,
    Border,
    Cellpadding,
    Cellspacing,
    Charset,
    Checked,
    Cite,
    Class,
    Color,
    Cols,
    Colspan,
    Content,
    Contenteditable,
    Controls,
    Coords,
    Data,
    Datetime,
    Defer,
    Dir,
    Disabled,
    Download,
    Draggable,
    Enctype,
    Face,
    For,
    Form,
    Frameborder,
    Headers,
    Height,
    Hidden,
    Href,
    Hreflang,
    #[strum(serialize = "http-equiv")]
    HttpEquiv,
    Id,
    Ismap,
    Label,
    Lang,
    Language,
    List,
    Loop,
    Max,
    Maxlength,
    Media,
    Method,
    Min,
    Multiple,
    Muted,
    Name,
    Nohref,
    Noshade,
    Novalidate,
    Nowrap,
    Open,
    Pattern,
    Placeholder,
    Readonly,
    Rel,
    Required,
    Reversed,
    Role,
    Rows,
    Rowspan,
    Sandbox,
    Scope,
    Selected,
    Shape,
    Size,
    Sizes,
    Span,
    Src,
    Srcset,
    Start,
    Step,
    Style,
    Summary,
    Tabindex,
    Target,
    Title,
    Type,
    Usemap,
    Valign,
    Value,
    Version,
    Width,
    Xmlns,
    #[strum(serialize = "xml:lang")]
    XmlLang,
    Onabort,
    Onblur,
    Onchange,
    Onclick,
    Ondblclick,
    Onerror,
    Onfocus,
    Oninput,
    Onkeydown,
    Onkeypress,
    Onkeyup,
    Onload,
    Onmousedown,
    Onmousemove,
    Onmouseout,
    Onmouseover,
    Onmouseup,
    Onreset,
    Onresize,
    Onscroll,
    Onselect,
    Onsubmit,
    Onunload,
}

impl AttrId {
    /// Look up a known attribute by name, case-insensitively.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// The canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// True for the `on*` event handler attributes.
    #[must_use]
    pub fn is_event_handler(self) -> bool {
        self.name().starts_with("on")
    }

    /// True for attributes whose presence alone carries the meaning
    /// (`checked`, `disabled`, ...). These may be printed without a value.
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(
            self,
            Self::Async
                | Self::Autofocus
                | Self::Checked
                | Self::Controls
                | Self::Defer
                | Self::Disabled
                | Self::Hidden
                | Self::Ismap
                | Self::Loop
                | Self::Multiple
                | Self::Muted
                | Self::Nohref
                | Self::Noshade
                | Self::Novalidate
                | Self::Nowrap
                | Self::Open
                | Self::Readonly
                | Self::Required
                | Self::Reversed
                | Self::Selected
        )
    }
}

/// An attribute on an element.
///
/// Attributes keep the order they appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The name as written in the source, lowercased.
    pub name: String,
    /// The decoded value. Bare attributes have an empty value.
    pub value: String,
    /// The known attribute this is, if any.
    pub id: Option<AttrId>,
}

impl Attribute {
    /// Create an attribute, resolving its id from the name.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let id = AttrId::lookup(&name);
        Self {
            name,
            value: value.into(),
            id,
        }
    }

    /// True for known `on*` event handlers.
    #[must_use]
    pub fn is_event_handler(&self) -> bool {
        self.id.is_some_and(AttrId::is_event_handler)
    }

    /// True for known boolean attributes.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.id.is_some_and(AttrId::is_boolean)
    }
}
