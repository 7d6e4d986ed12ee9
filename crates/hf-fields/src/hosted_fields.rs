//! Hosted Fields Component
//!
//! Construction validates the whole configuration before touching the
//! merchant page, then injects one frame per field and waits for every
//! frame to report ready. After teardown every public method fails with
//! `MethodCalledAfterTeardown`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use hf_bus::{BusError, BusEvent, EventLoop, MessageBus, Reply, TimerId};
use hf_dom::{Document, NodeId};
use serde_json::{json, Value};
use url::Url;

use crate::client::{Analytics, Client, ClientSource};
use crate::constants::{analytics, classes, RESERVED_FRAME_PREFIX, VERSION};
use crate::emitter::{EventEmitter, ListenerId};
use crate::frame::{compose_url, create_frame, inject_frame};
use crate::labels::{bind_label_focus, LabelBinding};
use crate::registry::{FieldEntry, FieldRegistry, ReadyOutcome, Readiness};
use crate::state::{parse_tokenize_response, StateObject, TokenizeOptions, TokenizePayload};
use crate::teardown::TeardownRegistry;
use crate::translator::translate_input_event;
use crate::{CreateOptions, EventData, FieldKey, FieldOptions, HostedFieldsError, HostedFieldsEvent, Host};

/// Completion callback of `set_placeholder`, `clear`, `focus` and `teardown`
pub type Callback = Box<dyn FnOnce(Option<HostedFieldsError>)>;

/// Completion callback of `tokenize`
pub type TokenizeCallback = Box<dyn FnOnce(Result<TokenizePayload, HostedFieldsError>)>;

/// Tokenize callback awaiting its reply; emptied once it has run
type TokenizeSlot = Rc<RefCell<Option<TokenizeCallback>>>;

struct Inner {
    channel_id: String,
    client: Rc<dyn Client>,
    analytics: Rc<dyn Analytics>,
    document: Rc<RefCell<Document>>,
    event_loop: EventLoop,
    bus: MessageBus,
    registry: FieldRegistry,
    /// Frames and their clearing elements, in insertion order
    injected: Vec<NodeId>,
    labels: RefCell<Vec<LabelBinding>>,
    readiness: RefCell<Readiness<Reply>>,
    load_timer: Cell<Option<TimerId>>,
    frame_options: Value,
    emitter: EventEmitter<HostedFieldsEvent, EventData>,
    state: RefCell<Option<StateObject>>,
    pending_tokenize: RefCell<Vec<TokenizeSlot>>,
    teardown: RefCell<TeardownRegistry>,
    live: Cell<bool>,
}

/// A live set of hosted fields on one merchant page.
///
/// Bus handlers and the load timer keep the component alive until
/// `teardown`, so dropping every handle leaves the frames running.
#[derive(Clone)]
#[must_use = "hosted fields stay injected until `teardown` is called"]
pub struct HostedFields {
    inner: Rc<Inner>,
}

impl HostedFields {
    /// Validate `options`, inject the field frames and start waiting for
    /// them. Configuration errors leave the document untouched.
    pub fn create(host: &Host, options: CreateOptions) -> Result<Self, HostedFieldsError> {
        let client = resolve_client(host, options.client.as_ref())?;
        let configuration = client.get_configuration();

        let client_version = configuration.analytics_metadata.sdk_version;
        if client_version != VERSION {
            return Err(HostedFieldsError::IncompatibleVersions {
                client: client_version,
                hosted_fields: VERSION.to_string(),
            });
        }

        let requested = options.fields.as_ref().ok_or(HostedFieldsError::FieldsRequired)?;
        for name in requested.keys() {
            if name.parse::<FieldKey>().is_err() {
                tracing::debug!("Ignoring unsupported field {:?}", name);
            }
        }
        let fields: Vec<(FieldKey, &FieldOptions)> = FieldKey::ALL
            .into_iter()
            .filter_map(|key| requested.get(key.as_str()).map(|o| (key, o)))
            .collect();
        if fields.is_empty() {
            return Err(HostedFieldsError::NoSupportedFields);
        }

        let channel_id = uuid::Uuid::new_v4().to_string();
        let frame_url = compose_url(
            &configuration.gateway_configuration.assets_url,
            &host.config.frame_path,
            &channel_id,
        )?;
        let containers = resolve_containers(&host.document.borrow(), &fields)?;
        let frame_options = options.frame_options().map_err(BusError::from)?;
        tracing::debug!("Creating hosted fields on channel {}", channel_id);

        let bus = MessageBus::new(channel_id.clone(), Rc::clone(&host.transport));
        let mut injection = Injection::default();
        if let Err(e) = injection.run(host, &bus, &frame_url, &containers) {
            bus.teardown();
            injection.rollback(&mut host.document.borrow_mut());
            return Err(e);
        }
        host.analytics.send_event(&*client, analytics::INITIALIZED);

        let inner = Rc::new(Inner {
            channel_id,
            client,
            analytics: Rc::clone(&host.analytics),
            document: Rc::clone(&host.document),
            event_loop: host.event_loop.clone(),
            bus,
            readiness: RefCell::new(Readiness::new(injection.registry.keys())),
            registry: injection.registry,
            injected: injection.nodes,
            labels: RefCell::new(injection.labels),
            load_timer: Cell::new(None),
            frame_options,
            emitter: EventEmitter::new(),
            state: RefCell::new(None),
            pending_tokenize: RefCell::default(),
            teardown: RefCell::new(TeardownRegistry::new()),
            live: Cell::new(true),
        });

        // Strong references: the timer is cleared and the bus handlers
        // dropped at teardown, which releases the component.
        let owner = Rc::clone(&inner);
        let timer = host
            .event_loop
            .set_timeout(host.config.load_timeout_ms, move || owner.on_load_timeout());
        inner.load_timer.set(Some(timer));

        let owner = Rc::clone(&inner);
        inner.bus.on(BusEvent::FrameReady, move |payload, reply| {
            owner.on_frame_ready(&payload, reply);
        });
        let owner = Rc::clone(&inner);
        inner.bus.on(BusEvent::InputEvent, move |payload, _| {
            owner.on_input_event(payload);
        });

        inner.register_teardown();
        Ok(Self { inner })
    }

    /// Id scoping this component's bus traffic. Available after teardown.
    pub fn channel_id(&self) -> &str {
        &self.inner.channel_id
    }

    /// Subscribe to a public event
    pub fn on(
        &self,
        event: HostedFieldsEvent,
        listener: impl Fn(&EventData) + 'static,
    ) -> Result<ListenerId, HostedFieldsError> {
        self.inner.guard("on")?;
        Ok(self.inner.emitter.on(event, listener))
    }

    /// Unsubscribe. `Ok(false)` if the listener was not subscribed.
    pub fn off(&self, event: HostedFieldsEvent, id: ListenerId) -> Result<bool, HostedFieldsError> {
        self.inner.guard("off")?;
        Ok(self.inner.emitter.off(event, id))
    }

    /// Tokenize the card data in the field frames. The callback gets
    /// exactly one of an error or a payload.
    pub fn tokenize(&self, callback: Option<TokenizeCallback>) -> Result<(), HostedFieldsError> {
        self.request_tokenization("tokenize", TokenizeOptions::default(), callback)
    }

    pub fn tokenize_with_options(
        &self,
        options: TokenizeOptions,
        callback: Option<TokenizeCallback>,
    ) -> Result<(), HostedFieldsError> {
        self.request_tokenization("tokenize", options, callback)
    }

    fn request_tokenization(
        &self,
        operation: &'static str,
        options: TokenizeOptions,
        callback: Option<TokenizeCallback>,
    ) -> Result<(), HostedFieldsError> {
        self.inner.guard(operation)?;
        let callback = callback.ok_or(HostedFieldsError::CallbackRequired(operation))?;

        let slot: TokenizeSlot = Rc::new(RefCell::new(Some(callback)));
        let on_reply = {
            let slot = Rc::clone(&slot);
            move |response: Value| {
                let callback = slot.borrow_mut().take();
                if let Some(callback) = callback {
                    callback(parse_tokenize_response(response));
                }
            }
        };
        let sent = serde_json::to_value(&options)
            .map_err(BusError::from)
            .and_then(|payload| {
                self.inner
                    .bus
                    .emit_with_reply(BusEvent::TokenizationRequest, payload, on_reply)
            });

        if let Err(e) = sent {
            let callback = slot.borrow_mut().take();
            if let Some(callback) = callback {
                self.inner.event_loop.defer(move || callback(Err(e.into())));
            }
            return Ok(());
        }

        let mut pending = self.inner.pending_tokenize.borrow_mut();
        pending.retain(|slot| slot.borrow().is_some());
        pending.push(slot);
        Ok(())
    }

    /// Change the placeholder of `field`
    pub fn set_placeholder(
        &self,
        field: &str,
        placeholder: &str,
        callback: Option<Callback>,
    ) -> Result<(), HostedFieldsError> {
        self.send_to_field("setPlaceholder", field, callback, |key| {
            (BusEvent::SetPlaceholder, json!({ "field": key, "placeholder": placeholder }))
        })
    }

    /// Empty `field`
    pub fn clear(&self, field: &str, callback: Option<Callback>) -> Result<(), HostedFieldsError> {
        self.send_to_field("clear", field, callback, |key| {
            (BusEvent::ClearField, json!({ "field": key }))
        })
    }

    /// Move input focus into `field`
    pub fn focus(&self, field: &str, callback: Option<Callback>) -> Result<(), HostedFieldsError> {
        self.send_to_field("focus", field, callback, |key| {
            (BusEvent::TriggerInputFocus, json!({ "field": key }))
        })
    }

    fn send_to_field(
        &self,
        operation: &'static str,
        field: &str,
        callback: Option<Callback>,
        message: impl FnOnce(FieldKey) -> (BusEvent, Value),
    ) -> Result<(), HostedFieldsError> {
        self.inner.guard(operation)?;
        let outcome = self.inner.check_field(field, operation).and_then(|key| {
            let (event, payload) = message(key);
            self.inner.bus.emit(event, payload).map_err(HostedFieldsError::from)
        });
        self.inner.complete(operation, callback, outcome.err());
        Ok(())
    }

    /// Most recent field state, `None` before the first input event
    pub fn get_state(&self) -> Result<Option<StateObject>, HostedFieldsError> {
        self.inner.guard("getState")?;
        Ok(self.inner.state.borrow().clone())
    }

    /// Remove the frames, release the bus and disable this component.
    /// The callback receives the first cleanup error, if any.
    pub fn teardown(&self, callback: Option<Callback>) -> Result<(), HostedFieldsError> {
        self.inner.guard("teardown")?;
        let result = self.inner.teardown.borrow_mut().teardown();

        self.inner
            .analytics
            .send_event(&*self.inner.client, analytics::TEARDOWN_COMPLETED);
        tracing::info!("Hosted fields on channel {} torn down", self.inner.channel_id);
        self.inner.complete("teardown", callback, result.err());
        Ok(())
    }
}

impl std::fmt::Debug for HostedFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedFields")
            .field("channel_id", &self.inner.channel_id)
            .field("fields", &self.inner.registry.keys().collect::<Vec<_>>())
            .field("live", &self.inner.live.get())
            .finish()
    }
}

impl Inner {
    fn guard(&self, operation: &'static str) -> Result<(), HostedFieldsError> {
        if self.live.get() {
            Ok(())
        } else {
            Err(HostedFieldsError::MethodCalledAfterTeardown(operation))
        }
    }

    fn check_field(&self, field: &str, operation: &'static str) -> Result<FieldKey, HostedFieldsError> {
        let key = field.parse::<FieldKey>().map_err(|_| HostedFieldsError::InvalidField {
            field: field.to_string(),
            operation,
        })?;
        if !self.registry.contains(key) {
            return Err(HostedFieldsError::FieldNotPresent {
                field: field.to_string(),
                operation,
            });
        }
        Ok(key)
    }

    /// Hand `error` to `callback` on the next tick
    fn complete(&self, operation: &str, callback: Option<Callback>, error: Option<HostedFieldsError>) {
        match (callback, error) {
            (Some(callback), error) => self.event_loop.defer(move || callback(error)),
            (None, Some(error)) => tracing::warn!("{} failed: {}", operation, error),
            (None, None) => {}
        }
    }

    fn on_frame_ready(&self, payload: &Value, reply: Option<Reply>) {
        let Some(field) = payload
            .get("field")
            .and_then(Value::as_str)
            .and_then(|name| name.parse::<FieldKey>().ok())
        else {
            tracing::warn!("Frame ready without a known field: {}", payload);
            return;
        };

        let outcome = self.readiness.borrow_mut().mark_ready(field, reply);
        match outcome {
            ReadyOutcome::Waiting { remaining } => {
                tracing::debug!("Frame {} ready, {} remaining", field, remaining);
            }
            ReadyOutcome::Ignored => {
                tracing::debug!("Ignoring repeated or unexpected ready from {}", field);
            }
            ReadyOutcome::Complete(replies) => {
                if let Some(timer) = self.load_timer.take() {
                    self.event_loop.clear_timeout(timer);
                }
                for reply in replies {
                    if let Err(e) = reply.send(self.frame_options.clone()) {
                        tracing::warn!("Could not answer frame ready: {}", e);
                    }
                }
                tracing::info!("Hosted fields ready on channel {}", self.channel_id);
                self.emitter.emit(HostedFieldsEvent::Ready, &EventData::Ready);
            }
        }
    }

    fn on_input_event(&self, payload: Value) {
        match translate_input_event(&self.document, &self.registry, payload) {
            Ok((event, state)) => {
                self.state.replace(Some(state.clone()));
                self.emitter.emit(event, &EventData::State(state));
            }
            Err(e) => tracing::warn!("Dropping input event: {}", e),
        }
    }

    fn on_load_timeout(&self) {
        self.load_timer.set(None);
        let remaining = self.readiness.borrow().remaining();
        tracing::warn!(
            "Hosted fields on channel {} still waiting on {} frame(s)",
            self.channel_id,
            remaining
        );
        self.analytics.send_event(&*self.client, analytics::LOAD_TIMED_OUT);
    }

    fn register_teardown(self: &Rc<Self>) {
        let mut registry = self.teardown.borrow_mut();

        let weak = Rc::downgrade(self);
        registry.register("bus", move || {
            with_inner(&weak, |inner| {
                inner.bus.teardown();
                Ok(())
            })
        });
        let weak = Rc::downgrade(self);
        registry.register("pending tokenization", move || {
            with_inner(&weak, |inner| {
                for slot in inner.pending_tokenize.take() {
                    let callback = slot.borrow_mut().take();
                    if let Some(callback) = callback {
                        let error = BusError::TornDown(inner.channel_id.clone());
                        inner.event_loop.defer(move || callback(Err(error.into())));
                    }
                }
                Ok(())
            })
        });
        let weak = Rc::downgrade(self);
        registry.register("label listeners", move || {
            with_inner(&weak, |inner| {
                let mut document = inner.document.borrow_mut();
                for binding in inner.labels.take() {
                    binding.detach(&mut document);
                }
                Ok(())
            })
        });
        let weak = Rc::downgrade(self);
        registry.register("load timer", move || {
            with_inner(&weak, |inner| {
                if let Some(timer) = inner.load_timer.take() {
                    inner.event_loop.clear_timeout(timer);
                }
                Ok(())
            })
        });
        let weak = Rc::downgrade(self);
        registry.register("injected nodes", move || {
            with_inner(&weak, |inner| {
                remove_injected(&mut inner.document.borrow_mut(), &inner.injected)
            })
        });
        // Runs last: everything above may still need a live component.
        let weak = Rc::downgrade(self);
        registry.register("disable", move || {
            with_inner(&weak, |inner| {
                inner.live.set(false);
                inner.emitter.clear();
                Ok(())
            })
        });
    }
}

fn with_inner(
    weak: &Weak<Inner>,
    action: impl FnOnce(&Inner) -> Result<(), HostedFieldsError>,
) -> Result<(), HostedFieldsError> {
    match weak.upgrade() {
        Some(inner) => action(&inner),
        None => Ok(()),
    }
}

fn resolve_client(
    host: &Host,
    source: Option<&ClientSource>,
) -> Result<Rc<dyn Client>, HostedFieldsError> {
    match source {
        None => Err(HostedFieldsError::ClientRequired),
        Some(ClientSource::Client(client)) => Ok(Rc::clone(client)),
        Some(ClientSource::Authorization(authorization)) => {
            let factory = host
                .client_factory
                .as_ref()
                .ok_or(HostedFieldsError::ClientFactoryRequired)?;
            factory
                .create(authorization)
                .map_err(|e| HostedFieldsError::ClientCreation(e.to_string()))
        }
    }
}

/// Resolve every field's container, rejecting missing containers,
/// containers that already host a frame and containers shared by two
/// fields
fn resolve_containers(
    document: &Document,
    fields: &[(FieldKey, &FieldOptions)],
) -> Result<Vec<(FieldKey, NodeId)>, HostedFieldsError> {
    let reserved = format!("iframe[name^=\"{}\"]", RESERVED_FRAME_PREFIX);
    let mut owners: HashMap<NodeId, FieldKey> = HashMap::new();
    let mut containers = Vec::with_capacity(fields.len());

    for (key, options) in fields {
        let container = document
            .query_selector(&options.selector)
            .map_err(|source| HostedFieldsError::InvalidSelector {
                field: key.to_string(),
                source,
            })?
            .ok_or_else(|| HostedFieldsError::SelectorNotFound {
                field: key.to_string(),
                selector: options.selector.clone(),
            })?;

        if document.query_selector_in(container, &reserved)?.is_some() {
            return Err(HostedFieldsError::ContainerHasFrame { field: key.to_string() });
        }
        if let Some(first) = owners.insert(container, *key) {
            return Err(HostedFieldsError::DuplicateContainer {
                first: first.to_string(),
                second: key.to_string(),
            });
        }
        containers.push((*key, container));
    }
    Ok(containers)
}

/// DOM work of construction, kept so it can be undone if a later field
/// fails
#[derive(Default)]
struct Injection {
    registry: FieldRegistry,
    nodes: Vec<NodeId>,
    labels: Vec<LabelBinding>,
}

impl Injection {
    fn run(
        &mut self,
        host: &Host,
        bus: &MessageBus,
        frame_url: &Url,
        containers: &[(FieldKey, NodeId)],
    ) -> Result<(), HostedFieldsError> {
        for &(key, container) in containers {
            let frame = {
                let mut document = host.document.borrow_mut();
                let frame = create_frame(&mut document, key)?;
                self.nodes.extend(inject_frame(&mut document, frame, container)?);

                if host.platform.supports_label_focus() {
                    self.labels.push(bind_label_focus(&mut document, bus, key, container)?);
                }
                frame
            };
            self.registry.insert(key, FieldEntry { frame, container });

            let document = Rc::clone(&host.document);
            let src = frame_url.to_string();
            host.event_loop.defer(move || {
                if let Err(e) = document.borrow_mut().set_attribute(frame, "src", &src) {
                    tracing::warn!("Could not load frame for {}: {}", key, e);
                }
            });
            tracing::debug!("Injected frame for {}", key);
        }
        Ok(())
    }

    fn rollback(self, document: &mut Document) {
        for binding in self.labels {
            binding.detach(document);
        }
        if let Err(e) = remove_injected(document, &self.nodes) {
            tracing::warn!("Rollback of injected frames failed: {}", e);
        }
    }
}

/// Detach `nodes` in order and clear the state classes of their former
/// parents. Nodes already detached are skipped.
fn remove_injected(document: &mut Document, nodes: &[NodeId]) -> Result<(), HostedFieldsError> {
    for &node in nodes {
        let Some(parent) = document.parent(node) else {
            continue;
        };
        document.remove_child(parent, node)?;
        if let Ok(list) = document.class_list_mut(parent) {
            list.remove(&classes::ALL);
        }
    }
    Ok(())
}
