//! Document-level findings: which doctype was given and which HTML version
//! the content actually resembles.

use kempt_config::DetectedDoctype;
use kempt_dom::{DomTree, NodeId, NodeType, TagId};
use strum_macros::Display;

/// The HTML version a document's elements point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContentVersion {
    /// Uses sectioning or media elements introduced by HTML5, or nothing
    /// that pins an older version.
    #[strum(serialize = "HTML5")]
    Html5,
    /// Declared strict and free of presentational markup.
    #[strum(serialize = "HTML 4.01 Strict")]
    Html4Strict,
    /// Uses presentational elements such as `<font>` or `<center>`.
    #[strum(serialize = "HTML 4.01 Transitional")]
    Html4Transitional,
    /// Uses `<frameset>`.
    #[strum(serialize = "HTML 4.01 Frameset")]
    Html4Frameset,
}

/// The text for `DOCTYPE_GIVEN`: the public identifier if there is one,
/// otherwise the doctype name.
pub(crate) fn doctype_given(tree: &DomTree) -> Option<String> {
    let id = tree.doctype()?;
    match &tree.get(id)?.node_type {
        NodeType::Doctype {
            name, public_id, ..
        } => Some(public_id.clone().unwrap_or_else(|| name.clone())),
        _ => None,
    }
}

/// Guess the version from the elements used.
pub(crate) fn content_version(tree: &DomTree, declared: DetectedDoctype) -> ContentVersion {
    let mut html5 = false;
    let mut presentational = false;
    for id in tree.descendants(NodeId::ROOT) {
        match tree.tag(id) {
            Some(TagId::Frameset | TagId::Frame) => return ContentVersion::Html4Frameset,
            Some(
                TagId::Font
                | TagId::Center
                | TagId::Basefont
                | TagId::Applet
                | TagId::Strike
                | TagId::U
                | TagId::Dir,
            ) => presentational = true,
            Some(
                TagId::Article
                | TagId::Aside
                | TagId::Nav
                | TagId::Section
                | TagId::Header
                | TagId::Footer
                | TagId::Main
                | TagId::Figure
                | TagId::Figcaption
                | TagId::Video
                | TagId::Audio
                | TagId::Canvas
                | TagId::Mark
                | TagId::Time
                | TagId::Dialog
                | TagId::Search,
            ) => html5 = true,
            _ => {}
        }
    }

    if presentational {
        ContentVersion::Html4Transitional
    } else if html5 {
        ContentVersion::Html5
    } else {
        match declared {
            DetectedDoctype::Html4Strict | DetectedDoctype::Xhtml1 => ContentVersion::Html4Strict,
            DetectedDoctype::Html4Transitional => ContentVersion::Html4Transitional,
            DetectedDoctype::Html4Frameset => ContentVersion::Html4Frameset,
            DetectedDoctype::Omitted | DetectedDoctype::Html5 | DetectedDoctype::Other => {
                ContentVersion::Html5
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kempt_common::MessageLog;
    use kempt_html::{BuilderOptions, parse_document};

    fn version_of(html: &str) -> ContentVersion {
        let mut log = MessageLog::new();
        let outcome = parse_document(html, BuilderOptions::default(), &mut log);
        content_version(&outcome.tree, outcome.doctype)
    }

    #[test]
    fn presentational_markup_means_transitional() {
        assert_eq!(
            version_of("<article><font>x</font></article>"),
            ContentVersion::Html4Transitional
        );
    }

    #[test]
    fn html5_elements_mean_html5() {
        assert_eq!(version_of("<nav>x</nav>"), ContentVersion::Html5);
    }

    #[test]
    fn otherwise_the_declared_doctype_decides() {
        let strict = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\"><p>x</p>";
        assert_eq!(version_of(strict), ContentVersion::Html4Strict);
        assert_eq!(version_of("<p>x</p>"), ContentVersion::Html5);
        assert_eq!(ContentVersion::Html4Strict.to_string(), "HTML 4.01 Strict");
    }

    #[test]
    fn doctype_text_prefers_the_public_identifier() {
        let mut log = MessageLog::new();
        let strict = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\"><p>x</p>";
        let outcome = parse_document(strict, BuilderOptions::default(), &mut log);
        assert_eq!(
            doctype_given(&outcome.tree).as_deref(),
            Some("-//W3C//DTD HTML 4.01//EN")
        );
        let outcome = parse_document("<!DOCTYPE html><p>x</p>", BuilderOptions::default(), &mut log);
        assert_eq!(doctype_given(&outcome.tree).as_deref(), Some("html"));
    }
}
