//! Hosted Fields Errors

use hf_bus::BusError;
use hf_dom::DomError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who is expected to act on an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// The shopper entered something unacceptable
    Customer,
    /// The integration misuses the library
    Merchant,
    /// Transport or gateway failure
    Network,
    /// Library bug or broken frame
    Internal,
    #[serde(other)]
    Unknown,
}

/// Hosted fields error
#[derive(Debug, thiserror::Error)]
pub enum HostedFieldsError {
    #[error("options.client is required when instantiating Hosted Fields")]
    ClientRequired,

    #[error("a client factory is required to create Hosted Fields from an authorization")]
    ClientFactoryRequired,

    #[error("client could not be created: {0}")]
    ClientCreation(String),

    #[error(
        "Client (version {client}) and Hosted Fields (version {hosted_fields}) components must be from the same SDK version"
    )]
    IncompatibleVersions { client: String, hosted_fields: String },

    #[error("options.fields is required when instantiating Hosted Fields")]
    FieldsRequired,

    #[error("options.fields does not contain any supported field")]
    NoSupportedFields,

    #[error("Selector {selector:?} for field {field} does not reference a valid DOM node")]
    SelectorNotFound { field: String, selector: String },

    #[error("Selector for field {field} is invalid: {source}")]
    InvalidSelector {
        field: String,
        #[source]
        source: DomError,
    },

    #[error("Element for field {field} already contains a Braintree iframe")]
    ContainerHasFrame { field: String },

    #[error("Fields {first} and {second} resolve to the same container")]
    DuplicateContainer { first: String, second: String },

    #[error("Gateway assets url {url:?} is invalid: {source}")]
    InvalidAssetsUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("\"{field}\" is not a valid field. You must use a valid field option when calling {operation}")]
    InvalidField { field: String, operation: &'static str },

    #[error("Cannot call {operation} for \"{field}\" because it is not part of the current Hosted Fields options")]
    FieldNotPresent { field: String, operation: &'static str },

    #[error("{0} must include a callback function")]
    CallbackRequired(&'static str),

    #[error("{0} cannot be called after teardown")]
    MethodCalledAfterTeardown(&'static str),

    #[error("Malformed response from field frame: {0}")]
    MalformedResponse(String),

    /// Error produced inside a field frame, passed through as-is
    #[error("{message}")]
    Remote {
        kind: ErrorType,
        code: Option<String>,
        message: String,
        details: Option<Value>,
    },

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl HostedFieldsError {
    /// Classification of this error
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::Remote { kind, .. } => *kind,
            Self::MalformedResponse(_) | Self::Bus(_) | Self::Dom(_) => ErrorType::Internal,
            Self::ClientCreation(_) => ErrorType::Network,
            _ => ErrorType::Merchant,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &str {
        match self {
            Self::ClientRequired | Self::ClientFactoryRequired | Self::FieldsRequired => {
                "INSTANTIATION_OPTION_REQUIRED"
            }
            Self::ClientCreation(_) => "HOSTED_FIELDS_CLIENT_CREATION_FAILED",
            Self::IncompatibleVersions { .. } => "INCOMPATIBLE_VERSIONS",
            Self::NoSupportedFields | Self::SelectorNotFound { .. } | Self::InvalidSelector { .. } => {
                "HOSTED_FIELDS_INVALID_FIELD_SELECTOR"
            }
            Self::ContainerHasFrame { .. } => "HOSTED_FIELDS_FIELD_DUPLICATE_IFRAME",
            Self::DuplicateContainer { .. } => "HOSTED_FIELDS_DUPLICATE_CONTAINER",
            Self::InvalidAssetsUrl { .. } => "HOSTED_FIELDS_INVALID_ASSETS_URL",
            Self::InvalidField { .. } => "HOSTED_FIELDS_FIELD_INVALID",
            Self::FieldNotPresent { .. } => "HOSTED_FIELDS_FIELD_NOT_PRESENT",
            Self::CallbackRequired(_) => "CALLBACK_REQUIRED",
            Self::MethodCalledAfterTeardown(_) => "METHOD_CALLED_AFTER_TEARDOWN",
            Self::MalformedResponse(_) => "HOSTED_FIELDS_MALFORMED_RESPONSE",
            Self::Remote { code, .. } => code.as_deref().unwrap_or("HOSTED_FIELDS_REMOTE_ERROR"),
            Self::Bus(_) => "HOSTED_FIELDS_BUS_ERROR",
            Self::Dom(_) => "HOSTED_FIELDS_DOM_ERROR",
        }
    }

    /// Whether this error is the caller's misuse of the library
    pub fn is_configuration_error(&self) -> bool {
        self.error_type() == ErrorType::Merchant && !matches!(self, Self::MethodCalledAfterTeardown(_))
    }
}

/// Error object as a field frame reports it
#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    #[serde(rename = "type", default)]
    kind: Option<ErrorType>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

impl From<WireError> for HostedFieldsError {
    fn from(e: WireError) -> Self {
        HostedFieldsError::Remote {
            kind: e.kind.unwrap_or(ErrorType::Unknown),
            code: e.code,
            message: e.message.unwrap_or_else(|| "Field frame reported an error".to_string()),
            details: e.details,
        }
    }
}
