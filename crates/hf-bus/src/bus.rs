//! Message Bus
//!
//! Publish/subscribe scoped to one channel id. Each `MessageBus` is an
//! endpoint on a shared `Transport`; the merchant frame and every field
//! frame of one component hold a bus on the same channel.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::transport::{EndpointId, Inbox, Transport};
use crate::{BusError, BusEvent, Envelope};

type Handler = Rc<dyn Fn(Value, Option<Reply>)>;
type ReplyCallback = Box<dyn FnOnce(Value)>;

/// Subscription handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct BusInner {
    channel: String,
    transport: Rc<dyn Transport>,
    endpoint: Cell<Option<EndpointId>>,
    next_handler: Cell<u64>,
    handlers: RefCell<HashMap<BusEvent, Vec<(HandlerId, Handler)>>>,
    pending_replies: RefCell<HashMap<String, ReplyCallback>>,
}

/// Reply slot handed to a handler when the sender expects an answer
pub struct Reply {
    bus: Weak<BusInner>,
    reply_id: String,
}

impl Reply {
    /// Send the answer back to the requesting frame
    pub fn send(self, payload: Value) -> Result<(), BusError> {
        let bus = self.bus.upgrade().ok_or_else(|| BusError::TornDown(String::new()))?;
        let endpoint = bus
            .endpoint
            .get()
            .ok_or_else(|| BusError::TornDown(bus.channel.clone()))?;
        let envelope = Envelope::Reply {
            channel: bus.channel.clone(),
            reply_id: self.reply_id,
            payload,
        };
        bus.transport.post(endpoint, envelope.encode()?);
        Ok(())
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply").field("reply_id", &self.reply_id).finish()
    }
}

/// Channel-scoped bus endpoint
#[derive(Clone)]
pub struct MessageBus {
    inner: Rc<BusInner>,
}

impl MessageBus {
    /// Attach a new endpoint for `channel` to `transport`
    pub fn new(channel: impl Into<String>, transport: Rc<dyn Transport>) -> Self {
        let channel = channel.into();
        let inner = Rc::new_cyclic(|weak: &Weak<BusInner>| {
            let weak = weak.clone();
            let inbox: Inbox = Rc::new(move |data: &str| {
                if let Some(inner) = weak.upgrade() {
                    inner.receive(data);
                }
            });
            let endpoint = transport.attach(inbox);
            BusInner {
                channel,
                transport,
                endpoint: Cell::new(Some(endpoint)),
                next_handler: Cell::new(0),
                handlers: RefCell::default(),
                pending_replies: RefCell::default(),
            }
        });
        tracing::debug!("Bus attached on channel {}", inner.channel);
        Self { inner }
    }

    pub fn channel(&self) -> &str {
        &self.inner.channel
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.endpoint.get().is_none()
    }

    /// Subscribe to `event`. The handler gets the payload and, when the
    /// sender asked for an answer, a reply slot.
    pub fn on(
        &self,
        event: BusEvent,
        handler: impl Fn(Value, Option<Reply>) + 'static,
    ) -> HandlerId {
        let next = self.inner.next_handler.get() + 1;
        self.inner.next_handler.set(next);
        let id = HandlerId(next);
        self.inner
            .handlers
            .borrow_mut()
            .entry(event)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Unsubscribe. Returns false if the handler was not registered.
    pub fn off(&self, event: BusEvent, id: HandlerId) -> bool {
        let mut handlers = self.inner.handlers.borrow_mut();
        let Some(list) = handlers.get_mut(&event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(h, _)| *h != id);
        list.len() != before
    }

    /// Fire-and-forget publish
    pub fn emit(&self, event: BusEvent, payload: Value) -> Result<(), BusError> {
        self.post(event, payload, None)
    }

    /// Publish and register `on_reply` for the first answer
    pub fn emit_with_reply(
        &self,
        event: BusEvent,
        payload: Value,
        on_reply: impl FnOnce(Value) + 'static,
    ) -> Result<(), BusError> {
        let reply_id = uuid::Uuid::new_v4().to_string();
        self.post(event, payload, Some((reply_id, Box::new(on_reply))))
    }

    fn post(
        &self,
        event: BusEvent,
        payload: Value,
        reply: Option<(String, ReplyCallback)>,
    ) -> Result<(), BusError> {
        let endpoint = self
            .inner
            .endpoint
            .get()
            .ok_or_else(|| BusError::TornDown(self.inner.channel.clone()))?;

        let reply_id = reply.as_ref().map(|(id, _)| id.clone());
        let data = Envelope::Event {
            channel: self.inner.channel.clone(),
            event: event.wire_name(),
            payload,
            reply_id,
        }
        .encode()?;

        if let Some((id, callback)) = reply {
            self.inner.pending_replies.borrow_mut().insert(id, callback);
        }
        tracing::debug!("Bus {} emit {}", self.inner.channel, event);
        self.inner.transport.post(endpoint, data);
        Ok(())
    }

    /// Detach from the transport and drop all handlers and pending
    /// replies. Further emits fail with `BusError::TornDown`.
    pub fn teardown(&self) {
        if let Some(endpoint) = self.inner.endpoint.take() {
            self.inner.transport.detach(endpoint);
            self.inner.handlers.borrow_mut().clear();
            self.inner.pending_replies.borrow_mut().clear();
            tracing::debug!("Bus on channel {} torn down", self.inner.channel);
        }
    }
}

impl BusInner {
    fn receive(self: Rc<Self>, data: &str) {
        let envelope = match Envelope::decode(data) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!("Ignoring foreign message: {}", e);
                return;
            }
        };
        if envelope.channel() != self.channel || self.endpoint.get().is_none() {
            return;
        }

        match envelope {
            Envelope::Event {
                event,
                payload,
                reply_id,
                ..
            } => {
                let Some(event) = BusEvent::from_wire_name(&event) else {
                    tracing::debug!("Ignoring unknown bus event {}", event);
                    return;
                };
                let handlers: Vec<Handler> = self
                    .handlers
                    .borrow()
                    .get(&event)
                    .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
                    .unwrap_or_default();
                for handler in handlers {
                    let reply = reply_id.as_ref().map(|id| Reply {
                        bus: Rc::downgrade(&self),
                        reply_id: id.clone(),
                    });
                    handler(payload.clone(), reply);
                }
            }
            Envelope::Reply {
                reply_id, payload, ..
            } => {
                let callback = self.pending_replies.borrow_mut().remove(&reply_id);
                if let Some(callback) = callback {
                    callback(payload);
                }
            }
        }
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("channel", &self.inner.channel)
            .field("torn_down", &self.is_torn_down())
            .field("pending_replies", &self.inner.pending_replies.borrow().len())
            .finish()
    }
}
