//! Shared fixtures: a merchant page, recording analytics and a simulated
//! field frame on the component's channel.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hf_bus::{BusEvent, EndpointId, EventLoop, LocalTransport, MessageBus, Transport};
use hf_dom::{Document, NodeId};
use hf_fields::{
    Analytics, Client, CreateOptions, FieldOptions, Host, HostedFields, Platform, StaticClient,
};
use serde_json::{json, Value};

pub const ASSETS_URL: &str = "https://assets.example.com";

#[derive(Default)]
pub struct RecordingAnalytics {
    events: RefCell<Vec<String>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }
}

impl Analytics for RecordingAnalytics {
    fn send_event(&self, _client: &dyn Client, event: &str) {
        self.events.borrow_mut().push(event.to_string());
    }
}

/// `LocalTransport` that counts what passes through it
pub struct CountingTransport {
    inner: LocalTransport,
    posted: Cell<usize>,
}

impl CountingTransport {
    pub fn new(event_loop: EventLoop) -> Self {
        Self {
            inner: LocalTransport::new(event_loop),
            posted: Cell::new(0),
        }
    }

    pub fn posted_count(&self) -> usize {
        self.posted.get()
    }

    pub fn endpoint_count(&self) -> usize {
        self.inner.endpoint_count()
    }
}

impl Transport for CountingTransport {
    fn attach(&self, inbox: hf_bus::Inbox) -> EndpointId {
        self.inner.attach(inbox)
    }

    fn detach(&self, endpoint: EndpointId) {
        self.inner.detach(endpoint)
    }

    fn post(&self, from: EndpointId, data: String) {
        self.posted.set(self.posted.get() + 1);
        self.inner.post(from, data)
    }
}

/// Checkout page:
///
/// ```text
/// <label for="cc-number">Card</label>
/// <div id="cc-number"></div>
/// <label>CVV <div id="cvv"></div></label>
/// <div id="postal-code"></div>
/// ```
pub struct Page {
    pub event_loop: EventLoop,
    pub transport: Rc<CountingTransport>,
    pub analytics: Rc<RecordingAnalytics>,
    pub document: Rc<RefCell<Document>>,
    pub host: Host,
    pub number: NodeId,
    pub number_label: NodeId,
    pub cvv: NodeId,
    pub cvv_label: NodeId,
    pub postal_code: NodeId,
}

impl Page {
    pub fn new() -> Self {
        Self::on_platform(Platform::Desktop)
    }

    pub fn on_platform(platform: Platform) -> Self {
        let mut doc = Document::new();
        let body = doc.body();
        let number_label = doc.append_element(body, "label", &[("for", "cc-number")]).unwrap();
        let number = doc.append_element(body, "div", &[("id", "cc-number")]).unwrap();
        let cvv_label = doc.append_element(body, "label", &[]).unwrap();
        let cvv = doc.append_element(cvv_label, "div", &[("id", "cvv")]).unwrap();
        let postal_code = doc.append_element(body, "div", &[("id", "postal-code")]).unwrap();

        let event_loop = EventLoop::new();
        let transport = Rc::new(CountingTransport::new(event_loop.clone()));
        let analytics = Rc::new(RecordingAnalytics::default());
        let document = Rc::new(RefCell::new(doc));
        let host = Host::new(Rc::clone(&document), event_loop.clone())
            .with_transport(transport.clone())
            .with_analytics(analytics.clone())
            .with_platform(platform);

        Self {
            event_loop,
            transport,
            analytics,
            document,
            host,
            number,
            number_label,
            cvv,
            cvv_label,
            postal_code,
        }
    }

    pub fn client() -> Rc<dyn Client> {
        Rc::new(StaticClient::new(ASSETS_URL))
    }

    /// Number and CVV
    pub fn options() -> CreateOptions {
        CreateOptions::new()
            .client(Self::client())
            .field("number", FieldOptions::new("#cc-number"))
            .field("cvv", FieldOptions::new("#cvv"))
    }

    pub fn create(&self) -> HostedFields {
        hf_fields::create(&self.host, Self::options()).unwrap()
    }

    pub fn iframes(&self) -> Vec<NodeId> {
        self.document.borrow().query_selector_all("iframe").unwrap()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.document
            .borrow()
            .class_list(node)
            .is_some_and(|list| list.contains(class))
    }

    /// Simulated frame side of `fields`
    pub fn frame(&self, fields: &HostedFields) -> FrameSide {
        FrameSide {
            bus: MessageBus::new(fields.channel_id(), self.transport.clone()),
        }
    }
}

/// Field frames of one component, as seen from inside the frames
pub struct FrameSide {
    pub bus: MessageBus,
}

impl FrameSide {
    /// Report `field` ready; the returned slot fills with the options the
    /// merchant side answers with
    pub fn report_ready(&self, field: &str) -> Rc<RefCell<Option<Value>>> {
        let answer = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&answer);
        self.bus
            .emit_with_reply(BusEvent::FrameReady, json!({ "field": field }), move |options| {
                *slot.borrow_mut() = Some(options);
            })
            .unwrap();
        answer
    }

    pub fn send_input(&self, event_type: &str, emitted_by: &str, fields: Value) {
        self.bus
            .emit(
                BusEvent::InputEvent,
                json!({
                    "type": event_type,
                    "merchantPayload": { "emittedBy": emitted_by, "fields": fields, "cards": [] }
                }),
            )
            .unwrap();
    }

    /// Collect payloads of `event` sent to the frames
    pub fn record(&self, event: BusEvent) -> Rc<RefCell<Vec<Value>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        self.bus.on(event, move |payload, _| sink.borrow_mut().push(payload));
        seen
    }

    /// Answer every tokenization request with `response`
    pub fn answer_tokenization(&self, response: Value) {
        self.bus.on(BusEvent::TokenizationRequest, move |_, reply| {
            if let Some(reply) = reply {
                reply.send(response.clone()).unwrap();
            }
        });
    }
}

pub fn field_state(focused: bool, valid: bool, potentially_valid: bool) -> Value {
    json!({
        "isFocused": focused,
        "isEmpty": false,
        "isValid": valid,
        "isPotentiallyValid": potentially_valid
    })
}
