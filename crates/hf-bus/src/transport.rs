//! Transport
//!
//! The medium that carries encoded envelopes between frames. In a
//! browser this is `postMessage` fan-out across the frame tree; the
//! in-process `LocalTransport` reproduces its semantics: delivery is
//! asynchronous (on a later event loop tick) and goes to every attached
//! endpoint except the sender.

use std::cell::RefCell;
use std::rc::Rc;

use crate::EventLoop;

/// Endpoint (frame) identifier on a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointId(u64);

/// Receiver for encoded envelopes
pub type Inbox = Rc<dyn Fn(&str)>;

/// Cross-frame delivery medium
pub trait Transport {
    /// Attach an endpoint; `inbox` receives every message posted by others
    fn attach(&self, inbox: Inbox) -> EndpointId;

    /// Detach an endpoint. Messages not yet delivered are dropped for it.
    fn detach(&self, endpoint: EndpointId);

    /// Broadcast `data` to every other endpoint
    fn post(&self, from: EndpointId, data: String);
}

#[derive(Default)]
struct Endpoints {
    next_id: u64,
    attached: Vec<(EndpointId, Inbox)>,
}

/// In-process transport driven by an `EventLoop`
pub struct LocalTransport {
    event_loop: EventLoop,
    endpoints: Rc<RefCell<Endpoints>>,
}

impl LocalTransport {
    pub fn new(event_loop: EventLoop) -> Self {
        Self {
            event_loop,
            endpoints: Rc::default(),
        }
    }

    /// Number of attached endpoints
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.borrow().attached.len()
    }
}

impl Transport for LocalTransport {
    fn attach(&self, inbox: Inbox) -> EndpointId {
        let mut endpoints = self.endpoints.borrow_mut();
        endpoints.next_id += 1;
        let id = EndpointId(endpoints.next_id);
        endpoints.attached.push((id, inbox));
        id
    }

    fn detach(&self, endpoint: EndpointId) {
        self.endpoints
            .borrow_mut()
            .attached
            .retain(|(id, _)| *id != endpoint);
    }

    fn post(&self, from: EndpointId, data: String) {
        let endpoints = Rc::clone(&self.endpoints);
        self.event_loop.defer(move || {
            // Snapshot at delivery time: endpoints detached in between
            // must not receive.
            let receivers: Vec<Inbox> = endpoints
                .borrow()
                .attached
                .iter()
                .filter(|(id, _)| *id != from)
                .map(|(_, inbox)| Rc::clone(inbox))
                .collect();
            for inbox in receivers {
                inbox(&data);
            }
        });
    }
}
