//! Input Event Translation
//!
//! Turns a raw `INPUT_EVENT` from a field frame into the public event:
//! field names are resolved to merchant containers, the emitting
//! container's state classes are updated, and the typed state object is
//! handed back for re-emission. No bus traffic originates here.

use std::cell::RefCell;
use std::collections::BTreeMap;

use hf_dom::{Document, DomResult, NodeId};
use serde::Deserialize;
use serde_json::Value;

use crate::constants::classes;
use crate::registry::FieldRegistry;
use crate::state::{Card, FieldState, StateObject};
use crate::{FieldKey, HostedFieldsError, HostedFieldsEvent};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputEventMessage {
    #[serde(rename = "type")]
    event_type: String,
    merchant_payload: WirePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    emitted_by: String,
    fields: BTreeMap<String, WireFieldState>,
    #[serde(default)]
    cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFieldState {
    #[serde(default)]
    is_focused: bool,
    #[serde(default)]
    is_empty: bool,
    #[serde(default)]
    is_potentially_valid: bool,
    #[serde(default)]
    is_valid: bool,
    /// Set on submit-time validation: anything short of valid is invalid
    #[serde(default)]
    is_strictly_validating: bool,
}

/// Translate one `INPUT_EVENT` payload
pub fn translate_input_event(
    document: &RefCell<Document>,
    registry: &FieldRegistry,
    payload: Value,
) -> Result<(HostedFieldsEvent, StateObject), HostedFieldsError> {
    let malformed = |what: String| HostedFieldsError::MalformedResponse(what);

    let message: InputEventMessage =
        serde_json::from_value(payload).map_err(|e| malformed(format!("input event: {e}")))?;
    let event: HostedFieldsEvent = message
        .event_type
        .parse()
        .map_err(|_| malformed(format!("unknown input event type {:?}", message.event_type)))?;
    if event == HostedFieldsEvent::Ready {
        return Err(malformed("field frames cannot emit ready".into()));
    }

    let wire = message.merchant_payload;
    let emitted_by = wire
        .emitted_by
        .parse::<FieldKey>()
        .ok()
        .filter(|k| registry.contains(*k))
        .ok_or_else(|| malformed(format!("input event from unknown field {:?}", wire.emitted_by)))?;

    let mut fields = BTreeMap::new();
    let mut emitter_state = None;
    for (name, state) in wire.fields {
        let Some((key, container)) = name
            .parse::<FieldKey>()
            .ok()
            .and_then(|k| registry.container(k).map(|c| (k, c)))
        else {
            tracing::debug!("Dropping state of unconfigured field {:?}", name);
            continue;
        };
        if key == emitted_by {
            emitter_state = Some((state, container));
        }
        fields.insert(
            key,
            FieldState {
                container,
                is_focused: state.is_focused,
                is_empty: state.is_empty,
                is_potentially_valid: state.is_potentially_valid,
                is_valid: state.is_valid,
            },
        );
    }

    let (state, container) = emitter_state
        .ok_or_else(|| malformed(format!("input event lacks state for {emitted_by}")))?;
    apply_state_classes(
        &mut document.borrow_mut(),
        container,
        state.is_focused,
        state.is_valid,
        state.is_potentially_valid,
        state.is_strictly_validating,
    )?;

    Ok((
        event,
        StateObject {
            emitted_by,
            fields,
            cards: wire.cards,
        },
    ))
}

/// Toggle focused/valid/invalid on a container. While typing a field is
/// invalid only once it can no longer become valid; under strict
/// validation it is invalid unless fully valid.
pub fn apply_state_classes(
    document: &mut Document,
    container: NodeId,
    is_focused: bool,
    is_valid: bool,
    is_potentially_valid: bool,
    strict: bool,
) -> DomResult<()> {
    let invalid = if strict { !is_valid } else { !is_potentially_valid };
    let list = document.class_list_mut(container)?;
    list.toggle(classes::FOCUSED, Some(is_focused));
    list.toggle(classes::VALID, Some(is_valid));
    list.toggle(classes::INVALID, Some(invalid));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FieldEntry;
    use serde_json::json;

    fn fixture() -> (RefCell<Document>, FieldRegistry, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let number = doc.append_element(body, "div", &[("id", "cc-number")]).unwrap();
        let cvv = doc.append_element(body, "div", &[("id", "cvv")]).unwrap();
        let mut registry = FieldRegistry::default();
        registry.insert(FieldKey::Number, FieldEntry { frame: number, container: number });
        registry.insert(FieldKey::Cvv, FieldEntry { frame: cvv, container: cvv });
        (RefCell::new(doc), registry, number, cvv)
    }

    fn field(focused: bool, valid: bool, potentially: bool) -> Value {
        json!({
            "isFocused": focused,
            "isEmpty": false,
            "isValid": valid,
            "isPotentiallyValid": potentially
        })
    }

    #[test]
    fn test_containers_attached_and_classes_applied() {
        let (doc, registry, number, cvv) = fixture();
        let payload = json!({
            "type": "validityChange",
            "merchantPayload": {
                "emittedBy": "number",
                "fields": { "number": field(true, true, true), "cvv": field(false, false, true) },
                "cards": [{ "niceType": "Visa", "type": "visa", "code": { "name": "CVV", "size": 3 } }]
            }
        });

        let (event, state) = translate_input_event(&doc, &registry, payload).unwrap();

        assert_eq!(event, HostedFieldsEvent::ValidityChange);
        assert_eq!(state.emitted_by, FieldKey::Number);
        assert_eq!(state.fields[&FieldKey::Cvv].container, cvv);
        assert_eq!(state.cards[0].card_type, "visa");

        let doc = doc.borrow();
        let list = doc.class_list(number).unwrap();
        assert!(list.contains(classes::FOCUSED));
        assert!(list.contains(classes::VALID));
        assert!(!list.contains(classes::INVALID));
        assert!(doc.class_list(cvv).unwrap().is_empty());
    }

    #[test]
    fn test_strictness_selects_invalid_rule() {
        let (doc, _, number, _) = fixture();
        let mut doc = doc.into_inner();

        // Partial input while typing: not valid, but could become so.
        apply_state_classes(&mut doc, number, true, false, true, false).unwrap();
        assert!(!doc.class_list(number).unwrap().contains(classes::INVALID));

        apply_state_classes(&mut doc, number, false, false, true, true).unwrap();
        let list = doc.class_list(number).unwrap();
        assert!(list.contains(classes::INVALID));
        assert!(!list.contains(classes::FOCUSED));
    }

    #[test]
    fn test_unconfigured_fields_dropped() {
        let (doc, registry, _, _) = fixture();
        let payload = json!({
            "type": "focus",
            "merchantPayload": {
                "emittedBy": "cvv",
                "fields": { "cvv": field(true, false, true), "postalCode": field(false, false, true) }
            }
        });

        let (_, state) = translate_input_event(&doc, &registry, payload).unwrap();
        assert_eq!(state.fields.keys().copied().collect::<Vec<_>>(), vec![FieldKey::Cvv]);
        assert!(state.cards.is_empty());
    }

    #[test]
    fn test_rejects_bad_messages() {
        let (doc, registry, _, _) = fixture();
        let bad = [
            json!({ "type": "focus" }),
            json!({ "type": "explode", "merchantPayload": { "emittedBy": "cvv", "fields": {} } }),
            json!({ "type": "ready", "merchantPayload": { "emittedBy": "cvv", "fields": {} } }),
            json!({ "type": "focus", "merchantPayload": { "emittedBy": "postalCode", "fields": {} } }),
            json!({ "type": "focus", "merchantPayload": { "emittedBy": "cvv", "fields": {} } }),
        ];
        for payload in bad {
            let err = translate_input_event(&doc, &registry, payload).unwrap_err();
            assert_eq!(err.code(), "HOSTED_FIELDS_MALFORMED_RESPONSE");
        }
    }
}
