//! Form Lifecycle Tests
//!
//! Validation, live mode and submit against a recording transport.

use async_trait::async_trait;
use futures::executor::block_on;
use headless_content::{
    Error, Form, Mode, ReactiveCell, Result, SubmitOptions, Transport, TypeRegistry,
};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};

fn contact() -> Form {
    let definitions: Value = serde_json::from_str(include_str!("fixtures/contact_form.json")).unwrap();
    Form::from_value(&definitions, TypeRegistry::new()).unwrap()
}

fn fill(form: &Form) {
    form.set_value("name", json!("Alice Smith"));
    form.set_value("email", json!("alice@example.com"));
    form.set_value("topic", json!("support"));
    form.set_value("visit", json!("2024-05-01"));
    form.set_value("guests", json!("2"));
    form.set_value("urls", json!(["https://a.example.com"]));
    form.set_value("newsletter", json!(true));
}

/// Records requests and reports whether the form was processing at call time
#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<(String, Value)>>,
    response: Value,
    fail: bool,
    processing: RefCell<Option<ReactiveCell<bool>>>,
    saw_processing: Cell<bool>,
}

impl Recorder {
    fn answering(response: Value) -> Self {
        Self {
            response,
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn observe(&self, form: &Form) {
        *self.processing.borrow_mut() = Some(form.processing_cell());
    }
}

#[async_trait(?Send)]
impl Transport for Recorder {
    async fn request(&self, path: &str, params: &Value) -> Result<Value> {
        self.calls.borrow_mut().push((path.to_string(), params.clone()));
        if let Some(cell) = self.processing.borrow().as_ref() {
            self.saw_processing.set(cell.get());
        }
        if self.fail {
            return Err(Error::transport(path, 500, "server error"));
        }
        Ok(self.response.clone())
    }
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_required_string_with_minlength_ordering() {
    let form = contact();
    form.validate();
    assert_eq!(form.msg("name"), Some("required"));

    form.set_value("name", json!("Ali"));
    form.validate();
    assert_eq!(form.msg("name"), Some("minlength"));

    form.set_value("name", json!("Alice"));
    form.validate();
    assert_eq!(form.msg("name"), Some(""));
}

#[test]
fn test_each_kind_reports_its_rule() {
    let form = contact();
    fill(&form);
    form.set_value("email", json!("alice"));
    form.set_value("topic", json!("billing"));
    form.set_value("visit", json!("2023-12-24"));
    form.set_value("guests", json!(12));
    assert!(!form.validate());

    assert_eq!(form.msg("email"), Some("type"));
    assert_eq!(form.msg("topic"), Some("type"));
    assert_eq!(form.msg("visit"), Some("min"));
    assert_eq!(form.msg("guests"), Some("max"));
    assert_eq!(form.msg("newsletter"), Some(""));
}

#[test]
fn test_list_cardinality() {
    let form = contact();
    fill(&form);
    let urls = form.field("urls").unwrap();
    let list = urls.as_list().unwrap();

    let first = list.child_ids()[0];
    list.add(json!("https://b.example.com"));
    list.add(json!("https://c.example.com"));
    list.add(json!("https://d.example.com"));
    assert!(!list.validate());
    assert_eq!(list.msg(), "max");

    list.delete(first);
    assert!(list.validate());

    for id in list.child_ids() {
        list.delete(id);
    }
    list.validate();
    assert_eq!(list.msg(), "required");
}

#[test]
fn test_live_mode_updates_aggregate() {
    let form = contact().with_mode(Mode::Live);
    let valid = form.valid_cell();
    assert!(valid.get());

    form.set_value("email", json!("broken"));
    assert!(!valid.get());
    form.set_value("email", json!("fixed@example.com"));
    assert!(valid.get());

    let urls = form.field("urls").unwrap();
    let list = urls.as_list().unwrap();
    let id = list.add(json!("x".repeat(41)));
    assert_eq!(list.msg(), "type");
    assert!(!valid.get());
    list.set_child(id, json!("short"));
    assert!(valid.get());
}

// =============================================================================
// Submit
// =============================================================================

#[test]
fn test_invalid_submit_never_reaches_transport() {
    let form = contact();
    let transport = Recorder::answering(json!({ "ok": true }));
    let result = block_on(form.submit(&transport, "contact", SubmitOptions::default())).unwrap();

    assert!(!result.ok);
    assert_eq!(result.errno, 100);
    assert!(transport.calls.borrow().is_empty());
}

#[test]
fn test_submit_sends_data_and_resets() {
    let form = contact();
    fill(&form);
    let transport = Recorder::answering(json!({ "ok": true, "errno": 0, "id": 7 }));
    transport.observe(&form);

    let result = block_on(form.submit(&transport, "contact", SubmitOptions::default())).unwrap();
    assert!(result.is_success());
    assert_eq!(result.extra.get("id"), Some(&json!(7)));

    let calls = transport.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "contact");
    assert_eq!(
        calls[0].1,
        json!({
            "email": "alice@example.com",
            "guests": 2,
            "name": "Alice Smith",
            "newsletter": true,
            "topic": "support",
            "urls": ["https://a.example.com"],
            "visit": "2024-05-01"
        })
    );

    assert!(transport.saw_processing.get());
    assert!(!form.processing());
    assert_eq!(form.value("name"), Some(Value::Null));
}

#[test]
fn test_submit_without_reset_keeps_values() {
    let form = contact();
    fill(&form);
    let transport = Recorder::answering(json!({ "ok": false, "errno": 120 }));
    let options = SubmitOptions {
        validate: true,
        reset: false,
    };

    let result = block_on(form.submit(&transport, "contact", options)).unwrap();
    assert!(!result.is_fatal());
    assert_eq!(form.value("name"), Some(json!("Alice Smith")));
}

#[test]
fn test_transport_error_propagates_and_clears_processing() {
    let form = contact();
    fill(&form);
    let transport = Recorder::failing();
    transport.observe(&form);

    let err = block_on(form.submit(&transport, "contact", SubmitOptions::default())).unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(transport.saw_processing.get());
    assert!(!form.processing());
    assert_eq!(form.value("name"), Some(json!("Alice Smith")));
}

#[test]
fn test_non_object_response_is_rejected() {
    let form = contact();
    fill(&form);
    let transport = Recorder::answering(json!("done"));

    let err = block_on(form.submit(&transport, "contact", SubmitOptions::default())).unwrap_err();
    assert!(matches!(err, Error::InvalidResponse { .. }));
    assert!(!form.processing());
    assert_eq!(form.value("name"), Some(json!("Alice Smith")));
}
