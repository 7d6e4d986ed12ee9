//! Hosted Fields Constants

/// Bus and frame markup version; must match the client's SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Milliseconds to wait for every frame to report ready before the
/// load timeout is reported to analytics
pub const INTEGRATION_TIMEOUT_MS: u64 = 60_000;

/// Name of the page each field frame loads
pub const FRAME_PATH: &str = "hosted-fields-frame.html";

/// Prefix of every iframe this library injects
pub const RESERVED_FRAME_PREFIX: &str = "braintree-";

/// Injected iframes are named `braintree-hosted-field-<field>`
pub const FRAME_NAME_PREFIX: &str = "braintree-hosted-field-";

/// Inline style of injected frames
pub const FRAME_STYLE: &str = "border: none; width: 100%; height: 100%; float: left;";

/// Inline style of the element injected after each frame
pub const CLEAR_BOTH_STYLE: &str = "clear: both;";

/// State classes applied to merchant containers
pub mod classes {
    pub const FOCUSED: &str = "braintree-hosted-fields-focused";
    pub const INVALID: &str = "braintree-hosted-fields-invalid";
    pub const VALID: &str = "braintree-hosted-fields-valid";

    pub const ALL: [&str; 3] = [FOCUSED, INVALID, VALID];
}

/// Analytics event names
pub mod analytics {
    pub const INITIALIZED: &str = "hosted-fields.initialized";
    pub const LOAD_TIMED_OUT: &str = "hosted-fields.load.timed-out";
    pub const TEARDOWN_COMPLETED: &str = "hosted-fields.teardown-completed";
}
