//! Public Events

use serde::{Deserialize, Serialize};

use crate::StateObject;

/// Events a hosted-fields component emits to merchant code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostedFieldsEvent {
    Ready,
    Blur,
    Focus,
    Empty,
    NotEmpty,
    CardTypeChange,
    ValidityChange,
    InputSubmitRequest,
}

impl HostedFieldsEvent {
    pub const ALL: [HostedFieldsEvent; 8] = [
        HostedFieldsEvent::Ready,
        HostedFieldsEvent::Blur,
        HostedFieldsEvent::Focus,
        HostedFieldsEvent::Empty,
        HostedFieldsEvent::NotEmpty,
        HostedFieldsEvent::CardTypeChange,
        HostedFieldsEvent::ValidityChange,
        HostedFieldsEvent::InputSubmitRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HostedFieldsEvent::Ready => "ready",
            HostedFieldsEvent::Blur => "blur",
            HostedFieldsEvent::Focus => "focus",
            HostedFieldsEvent::Empty => "empty",
            HostedFieldsEvent::NotEmpty => "notEmpty",
            HostedFieldsEvent::CardTypeChange => "cardTypeChange",
            HostedFieldsEvent::ValidityChange => "validityChange",
            HostedFieldsEvent::InputSubmitRequest => "inputSubmitRequest",
        }
    }
}

impl std::str::FromStr for HostedFieldsEvent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        HostedFieldsEvent::ALL.into_iter().find(|e| e.as_str() == s).ok_or(())
    }
}

impl std::fmt::Display for HostedFieldsEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a listener receives
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    Ready,
    State(StateObject),
}

impl EventData {
    pub fn state(&self) -> Option<&StateObject> {
        match self {
            EventData::State(state) => Some(state),
            EventData::Ready => None,
        }
    }
}
