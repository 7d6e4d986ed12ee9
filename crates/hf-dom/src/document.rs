//! Document - High-level document API

use crate::events::{EventType, Listener, ListenerId, ListenerRegistry};
use crate::{DOMTokenList, DomError, DomResult, DomTree, NodeId, Selector};

/// Merchant page document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    listeners: ListenerRegistry,
}

impl Document {
    /// Create a document with `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh detached nodes under a fresh root cannot fail to attach.
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            html_element: html,
            head_element: head,
            body_element: body,
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.tree.append_child(parent, child)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.tree.remove_child(parent, child)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    /// Create an element with attributes and append it to `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> DomResult<NodeId> {
        let node = self.tree.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(node, name, value)?;
        }
        self.tree.append_child(parent, node)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.element(node)?.attribute(name)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.tree
            .element_mut(node)
            .ok_or(DomError::NotAnElement(node))?
            .set_attribute(name, value);
        Ok(())
    }

    pub fn class_list(&self, node: NodeId) -> Option<&DOMTokenList> {
        self.tree.element(node).map(|e| e.class_list())
    }

    pub fn class_list_mut(&mut self, node: NodeId) -> DomResult<&mut DOMTokenList> {
        self.tree
            .element_mut(node)
            .map(|e| e.class_list_mut())
            .ok_or(DomError::NotAnElement(node))
    }

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(|e| e.id()) == Some(id))
    }

    /// First connected element matching `selector`
    pub fn query_selector(&self, selector: &str) -> DomResult<Option<NodeId>> {
        self.query_selector_in(self.tree.root(), selector)
    }

    /// All connected elements matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .tree
            .descendants(self.tree.root())
            .into_iter()
            .filter(|&n| selector.matches(&self.tree, n))
            .collect())
    }

    /// First descendant of `scope` matching `selector`
    pub fn query_selector_in(&self, scope: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .tree
            .descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(&self.tree, n)))
    }

    /// Ancestors of `node` with the given tag, nearest first
    pub fn ancestors_with_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        self.tree
            .ancestors(node)
            .filter(|&a| {
                self.tree
                    .element(a)
                    .is_some_and(|e| e.tag_name().eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: EventType,
        listener: Listener,
    ) -> DomResult<ListenerId> {
        if self.tree.element(node).is_none() {
            return Err(DomError::NotAnElement(node));
        }
        Ok(self.listeners.add(node, event_type, listener))
    }

    pub fn remove_event_listener(&mut self, node: NodeId, id: ListenerId) -> bool {
        self.listeners.remove(node, id)
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.count(node)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton() {
        let doc = Document::new();
        assert_eq!(doc.parent(doc.body()), Some(doc.document_element()));
        assert_eq!(doc.parent(doc.head()), Some(doc.document_element()));
    }

    #[test]
    fn test_query_ignores_detached_nodes() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.append_element(body, "div", &[("id", "cc-number")]).unwrap();
        assert_eq!(doc.query_selector("#cc-number").unwrap(), Some(div));

        doc.remove_child(body, div).unwrap();
        assert_eq!(doc.query_selector("#cc-number").unwrap(), None);
        assert_eq!(doc.get_element_by_id("cc-number"), None);
    }

    #[test]
    fn test_query_in_scope() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.append_element(body, "div", &[("id", "a")]).unwrap();
        let b = doc.append_element(body, "div", &[("id", "b")]).unwrap();
        let frame = doc.append_element(b, "iframe", &[("name", "braintree-x")]).unwrap();

        let sel = "iframe[name^=\"braintree-\"]";
        assert_eq!(doc.query_selector_in(a, sel).unwrap(), None);
        assert_eq!(doc.query_selector_in(b, sel).unwrap(), Some(frame));
    }

    #[test]
    fn test_listener_on_text_rejected() {
        let mut doc = Document::new();
        let text = doc.create_text("hi");
        let result = doc.add_event_listener(text, EventType::Click, std::rc::Rc::new(|_: &crate::DomEvent| {}));
        assert_eq!(result.err(), Some(DomError::NotAnElement(text)));
    }
}
