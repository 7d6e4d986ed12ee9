//! DOM Events
//!
//! Listener registry and bubbling dispatch for the handful of UI events
//! the merchant page produces (label clicks, focus changes).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{Document, NodeId};

/// DOM event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Focus,
    Blur,
}

impl EventType {
    /// Check if this event type bubbles
    pub fn bubbles(&self) -> bool {
        !matches!(self, EventType::Focus | EventType::Blur)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
        }
    }
}

/// DOM event as seen by a listener
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: NodeId,
}

/// Event listener callback
pub type Listener = Rc<dyn Fn(&DomEvent)>;

/// Handle returned by `add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registered {
    id: ListenerId,
    event_type: EventType,
    listener: Listener,
}

/// Listeners by target node
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    by_node: HashMap<NodeId, Vec<Registered>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener on `node`
    pub fn add(&mut self, node: NodeId, event_type: EventType, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_node.entry(node).or_default().push(Registered {
            id,
            event_type,
            listener,
        });
        id
    }

    /// Remove a listener. Returns false if it was not registered on `node`.
    pub fn remove(&mut self, node: NodeId, id: ListenerId) -> bool {
        let Some(list) = self.by_node.get_mut(&node) else {
            return false;
        };
        let before = list.len();
        list.retain(|r| r.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_node.remove(&node);
        }
        removed
    }

    /// Number of listeners registered on `node`
    pub fn count(&self, node: NodeId) -> usize {
        self.by_node.get(&node).map_or(0, Vec::len)
    }

    /// Listeners on `node` for `event_type`, in registration order
    pub fn listeners_for(&self, node: NodeId, event_type: EventType) -> Vec<Listener> {
        self.by_node
            .get(&node)
            .map(|list| {
                list.iter()
                    .filter(|r| r.event_type == event_type)
                    .map(|r| Rc::clone(&r.listener))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total: usize = self.by_node.values().map(Vec::len).sum();
        f.debug_struct("ListenerRegistry")
            .field("nodes", &self.by_node.len())
            .field("listeners", &total)
            .finish()
    }
}

/// Dispatch an event at `target`, bubbling to ancestors when the type
/// bubbles. Listeners run with the document borrow released so they may
/// touch the DOM themselves. Returns the number of listeners invoked.
pub fn dispatch_event(document: &RefCell<Document>, target: NodeId, event_type: EventType) -> usize {
    let path: Vec<(NodeId, Vec<Listener>)> = {
        let doc = document.borrow();
        let mut nodes = vec![target];
        if event_type.bubbles() {
            nodes.extend(doc.tree().ancestors(target));
        }
        nodes
            .into_iter()
            .map(|node| (node, doc.listeners().listeners_for(node, event_type)))
            .collect()
    };

    tracing::debug!("Dispatching {} at {}", event_type.as_str(), target);

    let mut invoked = 0;
    for (node, listeners) in path {
        let event = DomEvent {
            event_type,
            target,
            current_target: node,
        };
        for listener in listeners {
            listener(&event);
            invoked += 1;
        }
    }
    invoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_add_remove() {
        let mut registry = ListenerRegistry::new();
        let node = NodeId(3);
        let id = registry.add(node, EventType::Click, Rc::new(|_: &DomEvent| {}));
        registry.add(node, EventType::Focus, Rc::new(|_: &DomEvent| {}));

        assert_eq!(registry.count(node), 2);
        assert_eq!(registry.listeners_for(node, EventType::Click).len(), 1);
        assert!(registry.remove(node, id));
        assert!(!registry.remove(node, id));
        assert_eq!(registry.count(node), 1);
    }

    #[test]
    fn test_click_bubbles_focus_does_not() {
        let document = RefCell::new(Document::new());
        let (outer, inner) = {
            let mut doc = document.borrow_mut();
            let outer = doc.create_element("label");
            let inner = doc.create_element("span");
            let body = doc.body();
            doc.append_child(body, outer).unwrap();
            doc.append_child(outer, inner).unwrap();
            (outer, inner)
        };

        let hits = Rc::new(Cell::new(0));
        for event_type in [EventType::Click, EventType::Focus] {
            let hits = Rc::clone(&hits);
            document
                .borrow_mut()
                .add_event_listener(outer, event_type, Rc::new(move |_: &DomEvent| hits.set(hits.get() + 1)))
                .unwrap();
        }

        assert_eq!(dispatch_event(&document, inner, EventType::Click), 1);
        assert_eq!(dispatch_event(&document, inner, EventType::Focus), 0);
        assert_eq!(hits.get(), 1);
    }
}
