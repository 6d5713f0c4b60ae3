#![allow(clippy::unwrap_used, clippy::expect_used)]

use objvers_core::errors::{ExError, ExErrorKind, ObjversError};
use objvers_core::logging_facility::test_capture::init_test_capture;
use objvers_core::{log_op_end, log_op_error, log_op_start};
use objvers_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let events = capture.events();
    let start_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert!(
        !start_events.is_empty(),
        "Should have captured at least one start event"
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events();
    let end_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].fields.get("duration_ms"), Some(&"42".to_string()));
}

#[test]
fn test_log_op_error_from_domain_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ObjversError::MissingId {
        type_name: "Person".to_string(),
        id_property: "id".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(
        error_event.fields.get("err.code"),
        Some(&"ERR_MISSING_ID".to_string())
    );
    // the macro borrows, so the error is still usable
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::MissingId);
}

#[test]
fn test_boundary_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_unique_4";

    log_op_start!(op_name, global_id = "Person/1");
    log_op_end!(op_name, duration_ms = 42, change_count = 3);

    let events = capture.events_for_op(op_name);
    let starts = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .count();
    let ends = events
        .iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .count();

    assert_eq!(starts, 1, "Should have exactly one start event");
    assert_eq!(ends, 1, "Should have exactly one end event");
    assert_eq!(events[0].fields.get("global_id"), Some(&"Person/1".to_string()));
    assert_eq!(events[1].fields.get("change_count"), Some(&"3".to_string()));
}

#[test]
fn test_component_field_is_module_path() {
    let capture = init_test_capture();
    let op_name = "test_component_unique_5";

    log_op_start!(op_name);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].component.as_deref(),
        Some("logging_facility_tests")
    );
}
