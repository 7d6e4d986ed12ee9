//! Field State & Tokenization Payloads

use std::collections::BTreeMap;

use hf_dom::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WireError;
use crate::{FieldKey, HostedFieldsError};

/// State of one field, with the merchant container it lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldState {
    pub container: NodeId,
    pub is_focused: bool,
    pub is_empty: bool,
    pub is_potentially_valid: bool,
    pub is_valid: bool,
}

/// Card brand candidate reported by the number field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub nice_type: String,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<SecurityCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCode {
    pub name: String,
    pub size: u8,
}

/// Payload of every field event
#[derive(Debug, Clone, PartialEq)]
pub struct StateObject {
    pub emitted_by: FieldKey,
    pub fields: BTreeMap<FieldKey, FieldState>,
    pub cards: Vec<Card>,
}

impl StateObject {
    /// State of the field that emitted the event
    pub fn emitter(&self) -> Option<&FieldState> {
        self.fields.get(&self.emitted_by)
    }
}

/// Options sent with a tokenization request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeOptions {
    pub vault: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
}

/// Successful tokenization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizePayload {
    pub nonce: String,
    #[serde(default)]
    pub details: CardDetails,
    #[serde(rename = "type", default)]
    pub payment_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    #[serde(default)]
    pub last_two: String,
    #[serde(default)]
    pub card_type: String,
}

/// Interpret a `[error, payload]` tokenization reply. A non-null error
/// wins; otherwise the payload must be present and well-formed.
pub fn parse_tokenize_response(response: Value) -> Result<TokenizePayload, HostedFieldsError> {
    let Value::Array(mut parts) = response else {
        return Err(HostedFieldsError::MalformedResponse(
            "tokenization reply is not an [error, payload] pair".into(),
        ));
    };
    parts.resize(2, Value::Null);
    let payload = parts.pop().unwrap_or(Value::Null);
    let error = parts.pop().unwrap_or(Value::Null);

    if !error.is_null() {
        return Err(match serde_json::from_value::<WireError>(error) {
            Ok(wire) => wire.into(),
            Err(e) => HostedFieldsError::MalformedResponse(format!("unreadable error: {e}")),
        });
    }
    if payload.is_null() {
        return Err(HostedFieldsError::MalformedResponse(
            "tokenization reply carried neither error nor payload".into(),
        ));
    }
    serde_json::from_value(payload).map_err(|e| HostedFieldsError::MalformedResponse(e.to_string()))
}
