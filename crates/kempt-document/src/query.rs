//! Read-only access to the parsed tree.
//!
//! Every query answers `None` for a document that has not been parsed or a
//! node id that does not exist, so callers never see a panic for a stale id.

use kempt_dom::{DomTree, NodeId, NodeType};
use kempt_html::parser::dump_tree;

use crate::document::Document;

impl Document {
    /// The repaired tree, once a parse has run.
    #[must_use]
    pub const fn tree(&self) -> Option<&DomTree> {
        self.tree.as_ref()
    }

    /// The document node.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.tree.as_ref().map(|_| NodeId::ROOT)
    }

    /// The `<html>` element.
    #[must_use]
    pub fn html(&self) -> Option<NodeId> {
        self.tree.as_ref()?.document_element()
    }

    /// The `<head>` element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.tree.as_ref()?.head()
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.tree.as_ref()?.body()
    }

    /// Tag name for elements, `#text`, `#comment` and so on for the rest.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.tree.as_ref()?.get(id)?;
        Some(match &node.node_type {
            NodeType::Element(data) => data.tag_name.as_str(),
            NodeType::Doctype { name, .. } => name.as_str(),
            NodeType::ProcessingInstruction { target, .. } => target.as_str(),
            NodeType::Document => "#document",
            NodeType::Text(_) => "#text",
            NodeType::Comment(_) => "#comment",
            NodeType::CData(_) => "#cdata-section",
            NodeType::XmlDeclaration(_) => "#xml-declaration",
        })
    }

    /// The node's kind, e.g. `"element"` or `"text"`.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<&'static str> {
        Some(self.tree.as_ref()?.get(id)?.node_type.kind_name())
    }

    /// Name and value of each attribute, in source order. `None` for
    /// anything that is not an element.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Option<Vec<(&str, &str)>> {
        let data = self.tree.as_ref()?.as_element(id)?;
        Some(
            data.attrs
                .iter()
                .map(|a| (a.name.as_str(), a.value.as_str()))
                .collect(),
        )
    }

    /// One attribute's value.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.as_ref()?.as_element(id)?.attr(name)
    }

    /// The node's children.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        let tree = self.tree.as_ref()?;
        tree.get(id).map(|_| tree.children(id))
    }

    /// The node's parent. `None` for the document node too.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.as_ref()?.parent(id)
    }

    /// All text below the node, concatenated.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let tree = self.tree.as_ref()?;
        tree.get(id).map(|_| tree.text_content(id))
    }

    /// An indented dump of the tree for debugging.
    #[must_use]
    pub fn tree_dump(&self) -> Option<String> {
        self.tree.as_ref().map(|tree| dump_tree(tree, NodeId::ROOT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(html: &str) -> Document {
        let mut doc = Document::new();
        let _ = doc.parse_str(html).unwrap();
        doc
    }

    #[test]
    fn unparsed_document_answers_none() {
        let doc = Document::new();
        assert_eq!(doc.root(), None);
        assert_eq!(doc.body(), None);
        assert_eq!(doc.node_name(NodeId::ROOT), None);
        assert!(doc.tree_dump().is_none());
    }

    #[test]
    fn element_queries() {
        let doc = parsed("<p class=intro lang=en>Hi <b>there</b></p>");
        let body = doc.body().unwrap();
        let p = doc.children(body).unwrap()[0];
        assert_eq!(doc.node_name(p), Some("p"));
        assert_eq!(doc.node_type(p), Some("element"));
        assert_eq!(doc.attribute(p, "lang"), Some("en"));
        assert_eq!(
            doc.attributes(p).unwrap(),
            vec![("class", "intro"), ("lang", "en")]
        );
        assert_eq!(doc.parent(p), Some(body));
        assert_eq!(doc.text_content(p).as_deref(), Some("Hi there"));
    }

    #[test]
    fn stale_ids_answer_none() {
        let doc = parsed("<p>x</p>");
        let bogus = NodeId(10_000);
        assert_eq!(doc.node_name(bogus), None);
        assert_eq!(doc.children(bogus), None);
        assert_eq!(doc.text_content(bogus), None);
        assert_eq!(doc.parent(NodeId::ROOT), None);
    }

    #[test]
    fn text_nodes_are_not_elements() {
        let doc = parsed("<p>x</p>");
        let p = doc.children(doc.body().unwrap()).unwrap()[0];
        let text = doc.children(p).unwrap()[0];
        assert_eq!(doc.node_name(text), Some("#text"));
        assert_eq!(doc.attributes(text), None);
        assert_eq!(doc.html().and_then(|h| doc.node_name(h)), Some("html"));
    }
}
