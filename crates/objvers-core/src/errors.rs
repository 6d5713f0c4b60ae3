use objvers_core_types::{RequestContext, RequestId, TraceId};
use thiserror::Error;

/// Result type alias for metamodel and graph operations
pub type Result<T> = std::result::Result<T, ObjversError>;

/// Result type alias for operations surfaced through the canonical error facility
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Null, blank or otherwise invalid argument. Raised before any work is done.
    Validation,
    /// A type cannot be classified, or a value does not fit its declared type
    Mapping,
    /// An entity's identity property is null or absent
    MissingId,
    /// A referenced object has no recorded history
    NotFound,
    /// Persistence or read failure reported by the repository
    Repository,
    /// Commit id allocation observed a gap or a duplicate
    ConcurrentCommitConflict,
    Serialization,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Validation => "ERR_VALIDATION",
            ExErrorKind::Mapping => "ERR_MAPPING",
            ExErrorKind::MissingId => "ERR_MISSING_ID",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Repository => "ERR_REPOSITORY",
            ExErrorKind::ConcurrentCommitConflict => "ERR_CONCURRENT_COMMIT_CONFLICT",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, affected global id, commit id, correlation ids).
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    global_id: Option<String>,
    commit_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            global_id: None,
            commit_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the global id of the object the error concerns
    pub fn with_global_id(mut self, id: impl Into<String>) -> Self {
        self.global_id = Some(id.into());
        self
    }

    /// Add commit id context
    pub fn with_commit_id(mut self, id: impl Into<String>) -> Self {
        self.commit_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Stamp the correlation ids of a request context, keeping ids that are
    /// already set
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        if self.request_id.is_none() {
            self.request_id = Some(ctx.request_id.clone());
        }
        if self.trace_id.is_none() {
            self.trace_id = ctx.trace_id.clone();
        }
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn global_id(&self) -> Option<&str> {
        self.global_id.as_deref()
    }

    pub fn commit_id(&self) -> Option<&str> {
        self.commit_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {:?}", self.code(), self.kind)?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(global_id) = &self.global_id {
            write!(f, " (global_id: {})", global_id)?;
        }
        if let Some(commit_id) = &self.commit_id {
            write!(f, " (commit_id: {})", commit_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

/// Shorthand for a validation error raised by `op`
pub fn validation(op: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Validation)
        .with_op(op)
        .with_message(message)
}

/// Reject a blank required string argument
pub fn require_non_blank(op: &str, name: &str, value: &str) -> ExResult<()> {
    if value.trim().is_empty() {
        return Err(validation(op, format!("`{}` must not be blank", name)));
    }
    Ok(())
}

// ========== End Error Facility ==========

/// Domain error taxonomy for the metamodel and object-graph layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObjversError {
    /// A required argument was absent or blank
    #[error("Missing required argument: {name}")]
    MissingArgument { name: String },

    /// No explicit mapping, primitive rule or scanner descriptor covers the type
    #[error("Type not mapped: {type_name}")]
    UnknownType { type_name: String },

    /// A declared type expression could not be parsed
    #[error("Invalid declared type `{input}`: {reason}")]
    InvalidDeclaredType { input: String, reason: String },

    /// The scanner reported more than one identity property
    #[error("Type {type_name} declares more than one id property")]
    MultipleIdProperties { type_name: String },

    /// An explicit entity mapping names a property the type does not have
    #[error("Type {type_name} has no id property `{id_property}`")]
    UnknownIdProperty {
        type_name: String,
        id_property: String,
    },

    /// A property value does not fit the property's declared type
    #[error("Property {owner}.{property}: expected {expected}, found {found}")]
    TypeMismatch {
        owner: String,
        property: String,
        expected: String,
        found: String,
    },

    /// An entity instance has a null identity
    #[error("Entity {type_name} has null id property `{id_property}`")]
    MissingId {
        type_name: String,
        id_property: String,
    },

    /// Identity values must be integers or text
    #[error("Entity {type_name} has unsupported id value {found}")]
    InvalidIdValue { type_name: String, found: String },

    /// Only entities and value objects can be roots of a versioned graph
    #[error("Type {type_name} cannot be versioned as a graph root ({category})")]
    NotVersionable { type_name: String, category: String },

    /// A textual global id could not be parsed
    #[error("Invalid global id: {input}")]
    InvalidGlobalId { input: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<ObjversError> for ExError {
    fn from(err: ObjversError) -> Self {
        let message = err.to_string();
        match err {
            ObjversError::MissingArgument { .. } | ObjversError::InvalidGlobalId { .. } => {
                ExError::new(ExErrorKind::Validation).with_message(message)
            }
            ObjversError::MissingId { type_name, .. } => ExError::new(ExErrorKind::MissingId)
                .with_global_id(format!("{}/?", type_name))
                .with_message(message),
            ObjversError::TypeMismatch { owner, .. } => ExError::new(ExErrorKind::Mapping)
                .with_global_id(owner)
                .with_message(message),
            ObjversError::UnknownType { .. }
            | ObjversError::InvalidDeclaredType { .. }
            | ObjversError::MultipleIdProperties { .. }
            | ObjversError::UnknownIdProperty { .. }
            | ObjversError::InvalidIdValue { .. }
            | ObjversError::NotVersionable { .. } => {
                ExError::new(ExErrorKind::Mapping).with_message(message)
            }
            ObjversError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for ObjversError {
    fn from(err: serde_json::Error) -> Self {
        ObjversError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::Validation, "ERR_VALIDATION"),
            (ExErrorKind::Mapping, "ERR_MAPPING"),
            (ExErrorKind::MissingId, "ERR_MISSING_ID"),
            (ExErrorKind::Repository, "ERR_REPOSITORY"),
            (
                ExErrorKind::ConcurrentCommitConflict,
                "ERR_CONCURRENT_COMMIT_CONFLICT",
            ),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_missing_id_maps_to_missing_id_kind() {
        let err: ExError = ObjversError::MissingId {
            type_name: "Person".into(),
            id_property: "id".into(),
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::MissingId);
        assert_eq!(err.global_id(), Some("Person/?"));
    }

    #[test]
    fn test_unknown_type_maps_to_mapping_kind() {
        let err: ExError = ObjversError::UnknownType {
            type_name: "Ghost".into(),
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::Mapping);
        assert!(err.message().contains("Ghost"));
    }

    #[test]
    fn test_with_context_keeps_existing_request_id() {
        let original = RequestId::new();
        let ctx = RequestContext::new().with_trace_id(TraceId::new());
        let err = ExError::new(ExErrorKind::Internal)
            .with_request_id(original.clone())
            .with_context(&ctx);

        assert_eq!(err.request_id(), Some(&original));
        assert_eq!(err.trace_id(), ctx.trace_id.as_ref());
    }

    #[test]
    fn test_display_includes_code_and_op() {
        let err = validation("commit", "`author` must not be blank");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_VALIDATION]"));
        assert!(text.contains("'commit'"));
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("commit", "author", "ann").is_ok());
        let err = require_non_blank("commit", "author", "  ").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Validation);
    }
}
