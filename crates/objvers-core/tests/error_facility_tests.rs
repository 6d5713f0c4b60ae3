use objvers_core::errors::{ExError, ExErrorKind, ObjversError};
use objvers_core_types::{RequestContext, TraceId};

#[test]
fn test_missing_id_verifiable_by_kind() {
    let err = ObjversError::MissingId {
        type_name: "Person".to_string(),
        id_property: "id".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::MissingId);
    assert_eq!(ex_err.code(), "ERR_MISSING_ID");
    assert!(ex_err.message().contains("Person"));
}

#[test]
fn test_type_mismatch_names_owner() {
    let err = ObjversError::TypeMismatch {
        owner: "Person/1".to_string(),
        property: "age".to_string(),
        expected: "int".to_string(),
        found: "text".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Mapping);
    assert_eq!(ex_err.global_id(), Some("Person/1"));
    assert!(ex_err.message().contains("age"));
}

#[test]
fn test_invalid_global_id_is_validation() {
    let ex_err: ExError = ObjversError::InvalidGlobalId {
        input: "Person".to_string(),
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::Validation);
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::Validation, "ERR_VALIDATION"),
        (ExErrorKind::Mapping, "ERR_MAPPING"),
        (ExErrorKind::MissingId, "ERR_MISSING_ID"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::Repository, "ERR_REPOSITORY"),
        (ExErrorKind::ConcurrentCommitConflict, "ERR_CONCURRENT_COMMIT_CONFLICT"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut codes: Vec<&str> = kinds.iter().map(|(k, _)| k.code()).collect();
    for (kind, expected_code) in &kinds {
        assert_eq!(kind.code(), *expected_code);
    }
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), kinds.len(), "codes must be unique");
}

#[test]
fn test_request_context_stamped() {
    let ctx = RequestContext::new().with_trace_id(TraceId::from_string("trace-1".into()));
    let err = ExError::new(ExErrorKind::Repository)
        .with_op("persist")
        .with_context(&ctx);

    assert_eq!(err.request_id(), Some(&ctx.request_id));
    assert_eq!(err.trace_id().map(|t| t.as_str()), Some("trace-1"));
}
