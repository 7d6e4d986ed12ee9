//! Host Environment
//!
//! Everything a component needs from the page it runs on, passed in
//! explicitly: the merchant document, the event loop, the cross-frame
//! transport and the collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use hf_bus::{EventLoop, LocalTransport, Transport};
use hf_dom::Document;

use crate::client::{Analytics, ClientFactory, TracingAnalytics};
use crate::config::{Config, Platform};

#[derive(Clone)]
pub struct Host {
    pub document: Rc<RefCell<Document>>,
    pub event_loop: EventLoop,
    pub transport: Rc<dyn Transport>,
    pub analytics: Rc<dyn Analytics>,
    pub client_factory: Option<Rc<dyn ClientFactory>>,
    pub platform: Platform,
    pub config: Config,
}

impl Host {
    /// Host over `document` with an in-process transport on `event_loop`
    /// and analytics reported through `tracing`
    pub fn new(document: Rc<RefCell<Document>>, event_loop: EventLoop) -> Self {
        let transport = Rc::new(LocalTransport::new(event_loop.clone()));
        Self {
            document,
            event_loop,
            transport,
            analytics: Rc::new(TracingAnalytics),
            client_factory: None,
            platform: Platform::default(),
            config: Config::default(),
        }
    }

    pub fn with_transport(mut self, transport: Rc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_analytics(mut self, analytics: Rc<dyn Analytics>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_client_factory(mut self, factory: Rc<dyn ClientFactory>) -> Self {
        self.client_factory = Some(factory);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("event_loop", &self.event_loop)
            .field("platform", &self.platform)
            .field("config", &self.config)
            .field("client_factory", &self.client_factory.is_some())
            .finish_non_exhaustive()
    }
}
