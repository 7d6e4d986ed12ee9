//! Hosted Fields
//!
//! Card inputs that live in frames served from the payment provider's
//! origin, so card data never touches the merchant page. This crate is
//! the merchant-side half: it injects one frame per field, waits for the
//! frames to report ready, relays their input events as public events,
//! and forwards tokenization and field commands over a channel-scoped
//! message bus.
//!
//! ```ignore
//! let host = Host::new(document, event_loop);
//! let fields = hf_fields::create(
//!     &host,
//!     CreateOptions::new()
//!         .client(client)
//!         .field("number", FieldOptions::new("#cc-number"))
//!         .field("cvv", FieldOptions::new("#cvv")),
//! )?;
//! fields.on(HostedFieldsEvent::Ready, |_| println!("ready"))?;
//! ```

mod client;
mod config;
pub mod constants;
mod emitter;
mod error;
mod events;
mod field;
pub mod frame;
mod host;
mod hosted_fields;
pub mod labels;
pub mod registry;
mod state;
pub mod teardown;
pub mod translator;

pub use client::{
    Analytics, AnalyticsMetadata, Client, ClientFactory, ClientSource, Configuration,
    GatewayConfiguration, StaticClient, TracingAnalytics,
};
pub use config::{Config, CreateOptions, FieldOptions, Platform};
pub use constants::VERSION;
pub use emitter::{EventEmitter, ListenerId};
pub use error::{ErrorType, HostedFieldsError};
pub use events::{EventData, HostedFieldsEvent};
pub use field::FieldKey;
pub use host::Host;
pub use hosted_fields::{Callback, HostedFields, TokenizeCallback};
pub use state::{
    parse_tokenize_response, Card, CardDetails, FieldState, SecurityCode, StateObject,
    TokenizeOptions, TokenizePayload,
};

/// Create a hosted-fields component on `host`
pub fn create(host: &Host, options: CreateOptions) -> Result<HostedFields, HostedFieldsError> {
    HostedFields::create(host, options)
}
