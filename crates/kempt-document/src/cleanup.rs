//! Clean-up passes run between parsing and printing.
//!
//! Each pass is a plain function over the tree so it can be tested without a
//! [`crate::Document`]. Passes that change content report what they did.

use kempt_common::{MessageCode, MessageLog};
use kempt_config::DoctypeChoice;
use kempt_dom::{Category, DomTree, ElementData, NodeId, NodeType, TagId};

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

const HTML4_STRICT: (&str, &str) = (
    "-//W3C//DTD HTML 4.01//EN",
    "http://www.w3.org/TR/html4/strict.dtd",
);
const HTML4_TRANSITIONAL: (&str, &str) = (
    "-//W3C//DTD HTML 4.01 Transitional//EN",
    "http://www.w3.org/TR/html4/loose.dtd",
);

/// Remove every comment. Returns how many were removed.
pub(crate) fn hide_comments(tree: &mut DomTree) -> usize {
    let comments: Vec<NodeId> = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| {
            tree.get(id)
                .is_some_and(|n| matches!(n.node_type, NodeType::Comment(_)))
        })
        .collect();
    for &id in &comments {
        tree.detach(id);
    }
    comments.len()
}

/// Remove elements that have no content and no reason to exist empty,
/// innermost first, so that a parent emptied by the pass goes too.
///
/// Paragraphs are only removed when `drop_empty_paras` is set.
pub(crate) fn trim_empty_elements(
    tree: &mut DomTree,
    log: &mut MessageLog,
    drop_empty_paras: bool,
) -> usize {
    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    let mut removed = 0;
    for &id in order.iter().rev() {
        let Some(data) = tree.as_element(id) else {
            continue;
        };
        if !is_prunable(data, drop_empty_paras) || !is_empty(tree, id) {
            continue;
        }
        let name = data.tag_name.clone();
        let pos = tree.get(id).map(|n| n.pos);
        log::trace!("trimming empty <{name}>");
        let _ = log.report(MessageCode::TrimEmptyElement, pos, vec![name]);
        tree.detach(id);
        removed += 1;
    }
    removed
}

fn is_prunable(data: &ElementData, drop_empty_paras: bool) -> bool {
    if data.model.void || data.has_attr("id") || data.has_attr("name") {
        return false;
    }
    // Empty by nature, or placeholders for script and forms.
    if matches!(
        data.tag,
        TagId::Textarea
            | TagId::Iframe
            | TagId::Canvas
            | TagId::Object
            | TagId::Video
            | TagId::Audio
            | TagId::Template
            | TagId::Slot
            | TagId::Button
            | TagId::Output
            | TagId::Svg
            | TagId::Math
    ) {
        return false;
    }
    match data.model.category {
        Category::Paragraph => drop_empty_paras,
        Category::Block
        | Category::Heading
        | Category::List
        | Category::Preformatted
        | Category::Inline => true,
        Category::Structure
        | Category::Metadata
        | Category::ListItem
        | Category::RawText
        | Category::Table
        | Category::TableCaption
        | Category::TableSection
        | Category::TableRow
        | Category::TableCell
        | Category::Select => false,
    }
}

/// No children, or only whitespace outside preformatted content.
fn is_empty(tree: &DomTree, id: NodeId) -> bool {
    let preformatted = tree.as_element(id).is_some_and(|e| e.model.preformatted);
    tree.children(id).iter().all(|&child| {
        !preformatted
            && tree
                .as_text(child)
                .is_some_and(|text| text.trim_ascii().is_empty())
    })
}

/// Make the doctype match the `doctype` option.
pub(crate) fn apply_doctype(tree: &mut DomTree, choice: DoctypeChoice) {
    let existing = tree.doctype();
    let wanted = match choice {
        DoctypeChoice::Omit => {
            if let Some(id) = existing {
                tree.detach(id);
            }
            return;
        }
        DoctypeChoice::Auto if existing.is_some() => return,
        DoctypeChoice::Auto | DoctypeChoice::Html5 => doctype_node(None),
        DoctypeChoice::Strict => doctype_node(Some(HTML4_STRICT)),
        DoctypeChoice::Loose | DoctypeChoice::Transitional => {
            doctype_node(Some(HTML4_TRANSITIONAL))
        }
    };

    match existing {
        Some(id) => {
            if let Some(node) = tree.get_mut(id) {
                node.node_type = wanted;
            }
        }
        None => {
            let id = tree.alloc(wanted);
            match tree.first_child(NodeId::ROOT) {
                Some(first) => tree.insert_before(NodeId::ROOT, id, first),
                None => tree.append_child(NodeId::ROOT, id),
            }
        }
    }
}

fn doctype_node(ids: Option<(&str, &str)>) -> NodeType {
    NodeType::Doctype {
        name: "html".to_owned(),
        public_id: ids.map(|(public, _)| public.to_owned()),
        system_id: ids.map(|(_, system)| system.to_owned()),
    }
}

/// Give `<html>` the XHTML namespace if it has none.
pub(crate) fn add_xhtml_namespace(tree: &mut DomTree) {
    let Some(html) = tree.document_element() else {
        return;
    };
    if let Some(data) = tree.as_element_mut(html)
        && !data.has_attr("xmlns")
    {
        data.set_attr("xmlns", XHTML_NAMESPACE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kempt_html::{BuilderOptions, parse_document};

    /// Parse `html`, returning the tree and a fresh log for the pass under
    /// test.
    fn parse(html: &str) -> (DomTree, MessageLog) {
        let mut parse_log = MessageLog::new();
        let outcome = parse_document(html, BuilderOptions::default(), &mut parse_log);
        (outcome.tree, MessageLog::new())
    }

    fn body_names(tree: &DomTree) -> Vec<String> {
        let body = tree.body().unwrap();
        tree.children(body)
            .iter()
            .filter_map(|&c| tree.as_element(c).map(|e| e.tag_name.clone()))
            .collect()
    }

    #[test]
    fn comments_are_removed_everywhere() {
        let (mut tree, _) = parse("<!-- a --><p>x<!-- b --></p>");
        assert_eq!(hide_comments(&mut tree), 2);
        assert_eq!(hide_comments(&mut tree), 0);
    }

    #[test]
    fn empty_elements_are_trimmed_innermost_first() {
        let (mut tree, mut log) = parse("<p>a<b><i></i></b></p><div> </div><span id=x></span>");
        assert_eq!(trim_empty_elements(&mut tree, &mut log, true), 3);
        let keys: Vec<_> = log.messages().iter().map(|m| m.args[0].clone()).collect();
        assert_eq!(keys, vec!["div", "i", "b"]);
        assert_eq!(body_names(&tree), vec!["p", "span"]);
    }

    #[test]
    fn empty_paragraphs_follow_the_option() {
        let (mut tree, mut log) = parse("<p></p><p>x</p>");
        assert_eq!(trim_empty_elements(&mut tree, &mut log, false), 0);
        assert_eq!(trim_empty_elements(&mut tree, &mut log, true), 1);
        assert_eq!(body_names(&tree), vec!["p"]);
    }

    #[test]
    fn title_and_cells_are_kept() {
        let (mut tree, mut log) = parse("<table><tr><td></td></tr></table>");
        assert_eq!(trim_empty_elements(&mut tree, &mut log, true), 0);
        assert!(tree.find_first(NodeId::ROOT, TagId::Title).is_some());
    }

    #[test]
    fn doctype_is_inserted_replaced_or_removed() {
        let (mut tree, _) = parse("<p>x</p>");
        apply_doctype(&mut tree, DoctypeChoice::Auto);
        let id = tree.doctype().unwrap();
        assert_eq!(tree.first_child(NodeId::ROOT), Some(id));

        apply_doctype(&mut tree, DoctypeChoice::Strict);
        assert!(matches!(
            &tree.get(id).unwrap().node_type,
            NodeType::Doctype { public_id: Some(p), .. } if p == HTML4_STRICT.0
        ));

        apply_doctype(&mut tree, DoctypeChoice::Omit);
        assert!(tree.doctype().is_none());
    }

    #[test]
    fn auto_keeps_an_existing_doctype() {
        let (mut tree, _) = parse("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\"><p>x</p>");
        apply_doctype(&mut tree, DoctypeChoice::Auto);
        let id = tree.doctype().unwrap();
        assert!(matches!(
            &tree.get(id).unwrap().node_type,
            NodeType::Doctype { public_id: Some(_), .. }
        ));
    }

    #[test]
    fn namespace_is_added_once() {
        let (mut tree, _) = parse("<html xmlns=urn:x><p>x</p>");
        add_xhtml_namespace(&mut tree);
        let html = tree.document_element().unwrap();
        assert_eq!(tree.as_element(html).unwrap().attr("xmlns"), Some("urn:x"));
    }
}
