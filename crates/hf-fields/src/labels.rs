//! Label Focus
//!
//! A `<label>` pointing at a field container cannot focus an input that
//! lives in another frame, so clicks on such labels are forwarded to the
//! field frame as `TRIGGER_INPUT_FOCUS`.

use std::rc::Rc;

use hf_bus::{BusEvent, MessageBus};
use hf_dom::{Document, DomEvent, DomResult, EventType, Listener, ListenerId, NodeId};
use serde_json::json;

use crate::FieldKey;

/// Listeners installed for one field, removable at teardown
#[derive(Debug, Default)]
pub struct LabelBinding {
    listeners: Vec<(NodeId, ListenerId)>,
}

impl LabelBinding {
    /// Labels bridged for this field
    pub fn labels(&self) -> Vec<NodeId> {
        self.listeners.iter().map(|(node, _)| *node).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove every installed listener
    pub fn detach(self, document: &mut Document) {
        for (node, id) in self.listeners {
            document.remove_event_listener(node, id);
        }
    }
}

/// Labels that refer to `container`: `label[for=<id>]` first, then any
/// label wrapping the container. No id means no `for` lookup.
pub fn find_labels(document: &Document, container: NodeId) -> Vec<NodeId> {
    let mut labels = Vec::new();
    if let Some(id) = document.attribute(container, "id").filter(|id| !id.is_empty()) {
        // Compared directly rather than via `label[for=...]` so ids with
        // quotes need no escaping.
        let all = document.query_selector_all("label").unwrap_or_default();
        labels.extend(
            all.into_iter()
                .filter(|&label| document.attribute(label, "for") == Some(id)),
        );
    }
    for label in document.ancestors_with_tag(container, "label") {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Bridge clicks on `container`'s labels to focus requests for `field`
pub fn bind_label_focus(
    document: &mut Document,
    bus: &MessageBus,
    field: FieldKey,
    container: NodeId,
) -> DomResult<LabelBinding> {
    let mut binding = LabelBinding::default();
    for label in find_labels(document, container) {
        let bus = bus.clone();
        let listener: Listener = Rc::new(move |_: &DomEvent| {
            if let Err(e) = bus.emit(BusEvent::TriggerInputFocus, json!({ "field": field })) {
                tracing::debug!("Label focus for {} not forwarded: {}", field, e);
            }
        });
        let id = document.add_event_listener(label, EventType::Click, listener)?;
        binding.listeners.push((label, id));
    }
    if !binding.is_empty() {
        tracing::debug!("Bridged {} label(s) to {}", binding.listeners.len(), field);
    }
    Ok(binding)
}
