//! Example: Hosted fields on a checkout page
//!
//! The field frames are simulated with a bus endpoint on the component's
//! channel. Run with `RUST_LOG=debug` to watch the bus traffic.

use std::cell::RefCell;
use std::rc::Rc;

use hf_bus::{BusEvent, EventLoop, MessageBus};
use hf_dom::{dispatch_event, Document, EventType};
use hf_fields::{
    CreateOptions, EventData, FieldOptions, Host, HostedFieldsError, HostedFieldsEvent, StaticClient,
    TokenizePayload,
};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut page = Document::new();
    let body = page.body();
    let label = page.append_element(body, "label", &[("for", "card-number")])?;
    page.append_element(body, "div", &[("id", "card-number")])?;
    page.append_element(body, "div", &[("id", "card-cvv")])?;
    let document = Rc::new(RefCell::new(page));

    let event_loop = EventLoop::new();
    let host = Host::new(Rc::clone(&document), event_loop.clone());
    let transport = Rc::clone(&host.transport);

    let fields = hf_fields::create(
        &host,
        CreateOptions::new()
            .client(Rc::new(StaticClient::new("https://assets.example.com")))
            .field("number", FieldOptions::new("#card-number").placeholder("4111 1111 1111 1111"))
            .field("cvv", FieldOptions::new("#card-cvv").placeholder("123"))
            .styles(json!({ "input": { "font-size": "16px" } })),
    )?;
    println!("Hosted Fields v{} on channel {}", hf_fields::VERSION, fields.channel_id());

    fields.on(HostedFieldsEvent::Ready, |_| println!("All fields ready"))?;
    fields.on(HostedFieldsEvent::ValidityChange, |data: &EventData| {
        if let Some(state) = data.state() {
            let valid = state.emitter().is_some_and(|f| f.is_valid);
            println!("{} is now {}", state.emitted_by, if valid { "valid" } else { "invalid" });
        }
    })?;

    // The frame side of the channel
    let frames = MessageBus::new(fields.channel_id(), transport);
    frames.on(BusEvent::TriggerInputFocus, |payload, _| {
        println!("Frame asked to focus {}", payload["field"]);
    });
    frames.on(BusEvent::TokenizationRequest, |_, reply| {
        if let Some(reply) = reply {
            let answer = json!([null, {
                "nonce": "tokencc_example",
                "details": { "lastTwo": "11", "cardType": "Visa" },
                "type": "CreditCard"
            }]);
            if let Err(e) = reply.send(answer) {
                eprintln!("Frame could not answer: {e}");
            }
        }
    });
    for field in ["number", "cvv"] {
        frames.emit_with_reply(BusEvent::FrameReady, json!({ "field": field }), move |options| {
            println!("Frame {field} received {} option key(s)", options.as_object().map_or(0, |o| o.len()));
        })?;
    }
    event_loop.run_until_idle();

    frames.emit(
        BusEvent::InputEvent,
        json!({
            "type": "validityChange",
            "merchantPayload": {
                "emittedBy": "number",
                "fields": { "number": { "isFocused": true, "isEmpty": false, "isValid": true, "isPotentiallyValid": true } },
                "cards": [{ "niceType": "Visa", "type": "visa", "code": { "name": "CVV", "size": 3 } }]
            }
        }),
    )?;
    dispatch_event(&document, label, EventType::Click);
    event_loop.run_until_idle();

    fields.tokenize(Some(Box::new(|result: Result<TokenizePayload, HostedFieldsError>| match result {
        Ok(payload) => println!("Nonce: {} ({})", payload.nonce, payload.description.unwrap_or_default()),
        Err(e) => println!("Tokenization failed: {e}"),
    })))?;
    event_loop.run_until_idle();

    fields.teardown(Some(Box::new(|err: Option<HostedFieldsError>| match err {
        None => println!("Torn down"),
        Some(e) => println!("Teardown failed: {e}"),
    })))?;
    event_loop.run_until_idle();

    Ok(())
}
