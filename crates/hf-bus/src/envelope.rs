//! Envelope
//!
//! JSON wire format for bus traffic. Every envelope names its channel so
//! endpoints sharing one transport only see their own component's
//! traffic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Envelope {
    /// Published event, optionally expecting a reply
    #[serde(rename_all = "camelCase")]
    Event {
        channel: String,
        event: String,
        payload: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_id: Option<String>,
    },
    /// Answer to an event that carried a `reply_id`
    #[serde(rename_all = "camelCase")]
    Reply {
        channel: String,
        reply_id: String,
        payload: Value,
    },
}

impl Envelope {
    pub fn channel(&self) -> &str {
        match self {
            Envelope::Event { channel, .. } | Envelope::Reply { channel, .. } => channel,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
