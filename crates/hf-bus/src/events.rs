//! Bus Events
//!
//! Event kinds exchanged between the merchant frame and field frames.
//! On the wire each is namespaced, e.g. `hosted-fields:FRAME_READY`.

/// Namespace prefix for every bus event name
pub const EVENT_PREFIX: &str = "hosted-fields:";

/// Bus event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusEvent {
    /// Child -> parent, once per frame, with a reply slot for the
    /// creation options
    FrameReady,
    /// Child -> parent, field state change
    InputEvent,
    /// Parent -> child, with reply `[error, payload]`
    TokenizationRequest,
    /// Parent -> child
    SetPlaceholder,
    /// Parent -> child
    ClearField,
    /// Parent -> child
    TriggerInputFocus,
}

impl BusEvent {
    pub const ALL: [BusEvent; 6] = [
        BusEvent::FrameReady,
        BusEvent::InputEvent,
        BusEvent::TokenizationRequest,
        BusEvent::SetPlaceholder,
        BusEvent::ClearField,
        BusEvent::TriggerInputFocus,
    ];

    /// Unprefixed event name
    pub fn as_str(&self) -> &'static str {
        match self {
            BusEvent::FrameReady => "FRAME_READY",
            BusEvent::InputEvent => "INPUT_EVENT",
            BusEvent::TokenizationRequest => "TOKENIZATION_REQUEST",
            BusEvent::SetPlaceholder => "SET_PLACEHOLDER",
            BusEvent::ClearField => "CLEAR_FIELD",
            BusEvent::TriggerInputFocus => "TRIGGER_INPUT_FOCUS",
        }
    }

    /// Namespaced wire name
    pub fn wire_name(&self) -> String {
        format!("{}{}", EVENT_PREFIX, self.as_str())
    }

    /// Parse a namespaced wire name
    pub fn from_wire_name(name: &str) -> Option<Self> {
        let bare = name.strip_prefix(EVENT_PREFIX)?;
        Self::ALL.into_iter().find(|e| e.as_str() == bare)
    }
}

impl std::fmt::Display for BusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(BusEvent::FrameReady.wire_name(), "hosted-fields:FRAME_READY");
        for event in BusEvent::ALL {
            assert_eq!(BusEvent::from_wire_name(&event.wire_name()), Some(event));
        }
    }

    #[test]
    fn test_unprefixed_names_rejected() {
        assert_eq!(BusEvent::from_wire_name("FRAME_READY"), None);
        assert_eq!(BusEvent::from_wire_name("paypal:FRAME_READY"), None);
    }
}
