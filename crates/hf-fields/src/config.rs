//! Configuration
//!
//! Merchant-facing creation options plus the library-level `Config`.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{Client, ClientSource};
use crate::constants::{FRAME_PATH, INTEGRATION_TIMEOUT_MS};

/// Per-field options. Only `selector` is read here; everything else is
/// forwarded to the field frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldOptions {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Default::default()
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// Options for creating a hosted-fields component
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub client: Option<ClientSource>,
    /// Field key -> options. Keys outside the whitelist are ignored.
    pub fields: Option<BTreeMap<String, FieldOptions>>,
    /// Styles forwarded to the field frames
    pub styles: Option<Value>,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client: Rc<dyn Client>) -> Self {
        self.client = Some(ClientSource::Client(client));
        self
    }

    pub fn authorization(mut self, authorization: impl Into<String>) -> Self {
        self.client = Some(ClientSource::Authorization(authorization.into()));
        self
    }

    pub fn field(mut self, key: impl Into<String>, options: FieldOptions) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), options);
        self
    }

    /// Replace the field map with one parsed from merchant JSON
    pub fn fields_json(mut self, fields: Value) -> Result<Self, serde_json::Error> {
        self.fields = Some(serde_json::from_value(fields)?);
        Ok(self)
    }

    pub fn styles(mut self, styles: Value) -> Self {
        self.styles = Some(styles);
        self
    }

    /// What each frame receives once every frame is ready
    pub(crate) fn frame_options(&self) -> Result<Value, serde_json::Error> {
        let mut options = Map::new();
        if let Some(fields) = &self.fields {
            options.insert("fields".into(), serde_json::to_value(fields)?);
        }
        if let Some(styles) = &self.styles {
            options.insert("styles".into(), styles.clone());
        }
        Ok(Value::Object(options))
    }
}

/// Library configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Delay before a missing frame-ready is reported (ms)
    pub load_timeout_ms: u64,
    /// Page each field frame loads, relative to the versioned assets dir
    pub frame_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            load_timeout_ms: INTEGRATION_TIMEOUT_MS,
            frame_path: FRAME_PATH.to_string(),
        }
    }
}

/// Host platform, as far as label behaviour is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Desktop,
    Android,
    /// iOS Safari focuses inputs from label taps itself and a second,
    /// programmatic focus fights the virtual keyboard
    Ios,
}

impl Platform {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if ["iPhone", "iPad", "iPod"].iter().any(|d| user_agent.contains(d)) {
            Platform::Ios
        } else if user_agent.contains("Android") {
            Platform::Android
        } else {
            Platform::Desktop
        }
    }

    /// Whether label clicks should be bridged to field focus
    pub fn supports_label_focus(&self) -> bool {
        !matches!(self, Platform::Ios)
    }
}
