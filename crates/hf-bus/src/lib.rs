//! Hosted Fields Bus
//!
//! Message passing between the merchant frame and the field frames.
//! - `EventLoop`: single-threaded task queue and timers
//! - `Transport`: the frame-crossing medium (postMessage in a browser)
//! - `Envelope`: JSON wire format
//! - `MessageBus`: channel-scoped publish/subscribe with reply slots

mod bus;
mod envelope;
mod event_loop;
mod events;
mod transport;

pub use bus::{HandlerId, MessageBus, Reply};
pub use envelope::Envelope;
pub use event_loop::{EventLoop, TimerId};
pub use events::BusEvent;
pub use transport::{EndpointId, Inbox, LocalTransport, Transport};

/// Bus errors
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Bus on channel {0} has been torn down")]
    TornDown(String),

    #[error("Malformed bus message: {0}")]
    Serialization(#[from] serde_json::Error),
}
