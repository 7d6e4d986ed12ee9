//! Tokenization and per-field commands

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::Page;
use hf_bus::BusEvent;
use hf_fields::{
    Callback, ErrorType, HostedFieldsError, TokenizeCallback, TokenizeOptions, TokenizePayload,
};
use serde_json::json;

type Outcomes = Rc<RefCell<Vec<Result<TokenizePayload, HostedFieldsError>>>>;

fn tokenize_callback() -> (TokenizeCallback, Outcomes) {
    let outcomes: Outcomes = Rc::default();
    let sink = Rc::clone(&outcomes);
    (Box::new(move |result| sink.borrow_mut().push(result)), outcomes)
}

fn completion() -> (Callback, Rc<RefCell<Vec<Option<HostedFieldsError>>>>) {
    let seen: Rc<RefCell<Vec<Option<HostedFieldsError>>>> = Rc::default();
    let sink = Rc::clone(&seen);
    (Box::new(move |err| sink.borrow_mut().push(err)), seen)
}

#[test]
fn test_tokenize_requires_callback() {
    let page = Page::new();
    let fields = page.create();
    let posted = page.transport.posted_count();

    let err = fields.tokenize(None).unwrap_err();
    assert!(matches!(err, HostedFieldsError::CallbackRequired("tokenize")));
    assert_eq!(err.code(), "CALLBACK_REQUIRED");
    assert!(fields.tokenize_with_options(TokenizeOptions::default(), None).is_err());
    assert_eq!(page.transport.posted_count(), posted);
}

#[test]
fn test_tokenize_success() {
    let page = Page::new();
    let fields = page.create();
    let frames = page.frame(&fields);
    frames.answer_tokenization(json!([
        null,
        { "nonce": "fake-nonce", "details": { "lastTwo": "11", "cardType": "Visa" }, "type": "CreditCard" }
    ]));

    let (callback, outcomes) = tokenize_callback();
    fields.tokenize(Some(callback)).unwrap();
    assert!(outcomes.borrow().is_empty());
    page.event_loop.run_until_idle();

    let outcomes = outcomes.borrow();
    assert_eq!(outcomes.len(), 1);
    let payload = outcomes[0].as_ref().unwrap();
    assert_eq!(payload.nonce, "fake-nonce");
    assert_eq!(payload.details.last_two, "11");
}

#[test]
fn test_tokenize_error_passes_through() {
    let page = Page::new();
    let fields = page.create();
    let frames = page.frame(&fields);
    frames.answer_tokenization(json!([
        {
            "type": "CUSTOMER",
            "code": "HOSTED_FIELDS_FIELDS_INVALID",
            "message": "Some payment input fields are invalid.",
            "details": { "invalidFieldKeys": ["cvv"] }
        },
        null
    ]));

    let (callback, outcomes) = tokenize_callback();
    fields.tokenize(Some(callback)).unwrap();
    page.event_loop.run_until_idle();

    let outcomes = outcomes.borrow();
    assert_eq!(outcomes.len(), 1);
    let err = outcomes[0].as_ref().unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Customer);
    assert_eq!(err.code(), "HOSTED_FIELDS_FIELDS_INVALID");
    match err {
        HostedFieldsError::Remote { details, .. } => {
            assert_eq!(details.as_ref().unwrap()["invalidFieldKeys"][0], "cvv");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[test]
fn test_tokenize_answered_once_by_many_frames() {
    let page = Page::new();
    let fields = page.create();
    let first = page.frame(&fields);
    let second = page.frame(&fields);
    first.answer_tokenization(json!([null, { "nonce": "first" }]));
    second.answer_tokenization(json!([null, { "nonce": "second" }]));

    let (callback, outcomes) = tokenize_callback();
    fields.tokenize(Some(callback)).unwrap();
    page.event_loop.run_until_idle();

    assert_eq!(outcomes.borrow().len(), 1);
}

#[test]
fn test_tokenize_options_sent_to_frames() {
    let page = Page::new();
    let fields = page.create();
    let frames = page.frame(&fields);
    let requests = frames.record(BusEvent::TokenizationRequest);

    let (callback, _) = tokenize_callback();
    let options = TokenizeOptions {
        vault: true,
        cardholder_name: Some("Grace Hopper".into()),
    };
    fields.tokenize_with_options(options, Some(callback)).unwrap();
    page.event_loop.run_until_idle();

    assert_eq!(
        *requests.borrow(),
        vec![json!({ "vault": true, "cardholderName": "Grace Hopper" })]
    );
}

#[test]
fn test_field_commands_reach_frames() {
    let page = Page::new();
    let fields = page.create();
    let frames = page.frame(&fields);
    let placeholders = frames.record(BusEvent::SetPlaceholder);
    let clears = frames.record(BusEvent::ClearField);
    let focuses = frames.record(BusEvent::TriggerInputFocus);

    let (callback, seen) = completion();
    fields.set_placeholder("number", "1111 1111 1111 1111", Some(callback)).unwrap();
    fields.clear("cvv", None).unwrap();
    fields.focus("number", None).unwrap();
    assert!(seen.borrow().is_empty());
    page.event_loop.run_until_idle();

    assert!(matches!(seen.borrow().as_slice(), [None]));
    assert_eq!(
        *placeholders.borrow(),
        vec![json!({ "field": "number", "placeholder": "1111 1111 1111 1111" })]
    );
    assert_eq!(*clears.borrow(), vec![json!({ "field": "cvv" })]);
    assert_eq!(*focuses.borrow(), vec![json!({ "field": "number" })]);
}

#[test]
fn test_unknown_field_never_touches_bus() {
    let page = Page::new();
    let fields = page.create();
    let posted = page.transport.posted_count();

    let (callback, seen) = completion();
    fields.set_placeholder("cardholderName", "Name", Some(callback)).unwrap();
    assert!(seen.borrow().is_empty());
    page.event_loop.run_until_idle();

    match seen.borrow().as_slice() {
        [Some(err @ HostedFieldsError::InvalidField { field, operation })] => {
            assert_eq!(field, "cardholderName");
            assert_eq!(*operation, "setPlaceholder");
            assert_eq!(err.code(), "HOSTED_FIELDS_FIELD_INVALID");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(page.transport.posted_count(), posted);
}

#[test]
fn test_unconfigured_field_never_touches_bus() {
    let page = Page::new();
    let fields = page.create();
    let posted = page.transport.posted_count();

    for operation in ["setPlaceholder", "clear", "focus"] {
        let (callback, seen) = completion();
        let sent = match operation {
            "setPlaceholder" => fields.set_placeholder("postalCode", "12345", Some(callback)),
            "clear" => fields.clear("postalCode", Some(callback)),
            _ => fields.focus("postalCode", Some(callback)),
        };
        sent.unwrap();
        page.event_loop.run_until_idle();

        match seen.borrow().as_slice() {
            [Some(err @ HostedFieldsError::FieldNotPresent { operation: op, .. })] => {
                assert_eq!(*op, operation);
                assert_eq!(err.code(), "HOSTED_FIELDS_FIELD_NOT_PRESENT");
            }
            other => panic!("{operation}: unexpected outcome {other:?}"),
        }
    }
    assert_eq!(page.transport.posted_count(), posted);
}

#[test]
fn test_field_error_without_callback_is_not_fatal() {
    let page = Page::new();
    let fields = page.create();

    assert!(fields.clear("bogus", None).is_ok());
    assert!(fields.set_placeholder("postalCode", "x", None).is_ok());
    page.event_loop.run_until_idle();
}

#[test]
fn test_teardown_fails_pending_tokenization() {
    let page = Page::new();
    let fields = page.create();
    // Frames exist but never answer.
    let frames = page.frame(&fields);
    let requests = frames.record(BusEvent::TokenizationRequest);

    let (callback, outcomes) = tokenize_callback();
    fields.tokenize(Some(callback)).unwrap();
    page.event_loop.run_until_idle();
    assert_eq!(requests.borrow().len(), 1);
    assert!(outcomes.borrow().is_empty());

    fields.teardown(None).unwrap();
    assert!(outcomes.borrow().is_empty());
    page.event_loop.run_until_idle();

    match outcomes.borrow().as_slice() {
        [Err(err @ HostedFieldsError::Bus(_))] => assert_eq!(err.code(), "HOSTED_FIELDS_BUS_ERROR"),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_teardown_leaves_answered_tokenization_alone() {
    let page = Page::new();
    let fields = page.create();
    let frames = page.frame(&fields);
    frames.answer_tokenization(json!([null, { "nonce": "fake-nonce", "type": "CreditCard" }]));

    let (callback, outcomes) = tokenize_callback();
    fields.tokenize(Some(callback)).unwrap();
    page.event_loop.run_until_idle();
    fields.teardown(None).unwrap();
    page.event_loop.run_until_idle();

    let outcomes = outcomes.borrow();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].as_ref().unwrap().nonce, "fake-nonce");
}
