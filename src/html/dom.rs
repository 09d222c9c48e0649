//! Structural access to parsed, untrusted documents.
//!
//! Every query the sanitizer makes about a tree (tag name, parent, children,
//! attributes) and every mutation goes through these functions. They read
//! the typed node data produced by the parser, so nothing inside the markup
//! (an element named `documentElement`, an `id="attributes"`) can change what
//! they return.

use std::rc::Rc;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{Attribute, LocalName, Namespace, ParseOpts, QualName, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parses `html` into a detached document.
///
/// Parsing never runs scripts or fetches anything; scripting is reported as
/// disabled so `<noscript>` content is parsed as markup.
pub fn parse(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(RcDom::default(), opts).one(html)
}

/// The root element of a parsed document.
pub fn document_element(document: &Handle) -> Option<Handle> {
    children(document).into_iter().next()
}

/// Lowercased local name of an element, `None` for other nodes.
pub fn tag_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.to_ascii_lowercase().to_string()),
        _ => None,
    }
}

/// Whether the element lives in the HTML namespace (as opposed to SVG/MathML).
pub fn is_html_element(node: &Handle) -> bool {
    match node.data {
        NodeData::Element { ref name, .. } => &*name.ns == HTML_NAMESPACE,
        _ => false,
    }
}

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Snapshot of the element children of `node`.
pub fn children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// First element child with the given (lowercase) tag name.
pub fn child_by_tag(node: &Handle, tag: &str) -> Option<Handle> {
    children(node)
        .into_iter()
        .find(|child| tag_name(child).as_deref() == Some(tag))
}

fn qualified_name(name: &QualName) -> String {
    match name.prefix {
        Some(ref prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

/// Snapshot of an element's attributes as `(qualified name, value)` pairs.
pub fn attributes(node: &Handle) -> Vec<(String, String)> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|attr| (qualified_name(&attr.name), attr.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn get_attribute(node: &Handle, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| qualified_name(&attr.name) == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Sets an attribute, replacing an existing value or appending a new
/// un-namespaced attribute.
pub fn set_attribute(node: &Handle, name: &str, value: &str) {
    let NodeData::Element { ref attrs, .. } = node.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    if let Some(attr) = attrs
        .iter_mut()
        .find(|attr| qualified_name(&attr.name) == name)
    {
        attr.value = StrTendril::from_slice(value);
        return;
    }
    attrs.push(Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from_slice(value),
    });
}

pub fn remove_attribute(node: &Handle, name: &str) {
    if let NodeData::Element { ref attrs, .. } = node.data {
        attrs
            .borrow_mut()
            .retain(|attr| qualified_name(&attr.name) != name);
    }
}

/// Detaches `node` from its parent. The subtree is dropped with the last handle.
pub fn remove(node: &Handle) {
    let Some(parent) = parent(node) else {
        return;
    };
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, node));
    node.parent.set(None);
}

/// Inserts `new_node` into `parent` immediately before `reference`.
///
/// Appends when `reference` is not a child of `parent`.
pub fn insert_before(parent: &Handle, new_node: Handle, reference: &Handle) {
    let mut children = parent.children.borrow_mut();
    let index = children
        .iter()
        .position(|child| Rc::ptr_eq(child, reference))
        .unwrap_or(children.len());
    new_node.parent.set(Some(Rc::downgrade(parent)));
    children.insert(index, new_node);
}

pub fn create_comment(text: &str) -> Handle {
    Node::new(NodeData::Comment {
        contents: StrTendril::from_slice(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_ignores_clobbering_names() {
        let dom = parse(
            r#"<form id="documentElement" name="attributes"><input name="children"><input id="parentNode"></form>"#,
        );
        let root = document_element(&dom.document).unwrap();
        assert_eq!(tag_name(&root).as_deref(), Some("html"));

        let body = child_by_tag(&root, "body").unwrap();
        let form = child_by_tag(&body, "form").unwrap();
        assert_eq!(tag_name(&form).as_deref(), Some("form"));
        assert_eq!(children(&form).len(), 2);
        assert!(Rc::ptr_eq(&parent(&form).unwrap(), &body));
        assert_eq!(
            attributes(&form),
            vec![
                ("id".to_string(), "documentElement".to_string()),
                ("name".to_string(), "attributes".to_string()),
            ]
        );
    }

    #[test]
    fn test_attribute_mutation() {
        let dom = parse(r#"<a href="x" target="_top">link</a>"#);
        let body = child_by_tag(&document_element(&dom.document).unwrap(), "body").unwrap();
        let link = child_by_tag(&body, "a").unwrap();

        set_attribute(&link, "href", "y");
        remove_attribute(&link, "target");
        set_attribute(&link, "rel", "noopener");

        assert_eq!(get_attribute(&link, "href").as_deref(), Some("y"));
        assert_eq!(get_attribute(&link, "target"), None);
        assert_eq!(get_attribute(&link, "rel").as_deref(), Some("noopener"));
    }

    #[test]
    fn test_remove_and_insert_before() {
        let dom = parse("<p>one</p><div>two</div>");
        let body = child_by_tag(&document_element(&dom.document).unwrap(), "body").unwrap();
        let div = child_by_tag(&body, "div").unwrap();

        insert_before(&body, create_comment("marker"), &div);
        remove(&div);

        assert_eq!(children(&body).len(), 1);
        assert!(parent(&div).is_none());
        let kinds: Vec<bool> = body
            .children
            .borrow()
            .iter()
            .map(|child| matches!(child.data, NodeData::Comment { .. }))
            .collect();
        assert_eq!(kinds, vec![false, true]);
    }

    #[test]
    fn test_foreign_elements_are_not_html() {
        let dom = parse(r#"<svg><clipPath id="c"></clipPath></svg><p></p>"#);
        let body = child_by_tag(&document_element(&dom.document).unwrap(), "body").unwrap();
        let svg = child_by_tag(&body, "svg").unwrap();
        let clip = children(&svg).into_iter().next().unwrap();

        assert!(!is_html_element(&svg));
        assert_eq!(tag_name(&clip).as_deref(), Some("clippath"));
        assert!(is_html_element(&child_by_tag(&body, "p").unwrap()));
    }
}
