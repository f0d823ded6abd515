use formdesk_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in logs and by transport
/// adapters that want to branch on failures programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    InvalidConfig,
    ParseFailure,
    InvalidPeriod,
    UnsupportedAttachment,

    // Access
    AccessDenied,

    // Storage
    NotFound,
    StorageUnavailable,
    Persistence,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::ParseFailure => "ERR_PARSE_FAILURE",
            ExErrorKind::InvalidPeriod => "ERR_INVALID_PERIOD",
            ExErrorKind::UnsupportedAttachment => "ERR_UNSUPPORTED_ATTACHMENT",
            ExErrorKind::AccessDenied => "ERR_ACCESS_DENIED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::StorageUnavailable => "ERR_STORAGE_UNAVAILABLE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a failure of this kind may succeed when simply retried
    pub fn is_transient(&self) -> bool {
        matches!(self, ExErrorKind::StorageUnavailable)
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    project_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            project_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add project context
    pub fn with_project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
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

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
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

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(project_id) = &self.project_id {
            write!(f, " (project_id: {})", project_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors of the command workflow
///
/// Everything except `StorageUnavailable` is turned into a user-facing reply
/// by the handlers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeskError {
    /// Command recognised but the fields do not match its format
    #[error("Malformed command, expected: {expected_format}")]
    ParseFailure { expected_format: String },

    /// Sender may not act on the project (or it does not exist)
    #[error("Access denied for project {project_id}")]
    AccessDenied { project_id: String },

    /// Attachment of a type other than the configured document type
    #[error("Unsupported attachment type: {content_type}")]
    UnsupportedAttachment { content_type: String },

    /// Backing storage could not be reached in time
    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// Period field is neither weekly, monthly nor a 4-digit year
    #[error("Invalid period: {raw}")]
    InvalidPeriod { raw: String },
}

impl From<DeskError> for ExError {
    fn from(err: DeskError) -> Self {
        match err {
            DeskError::ParseFailure { expected_format } => {
                ExError::new(ExErrorKind::ParseFailure)
                    .with_op("parse")
                    .with_message(format!("expected: {}", expected_format))
            }
            DeskError::AccessDenied { project_id } => ExError::new(ExErrorKind::AccessDenied)
                .with_op("authorize")
                .with_project_id(project_id)
                .with_message("Access denied"),
            DeskError::UnsupportedAttachment { content_type } => {
                ExError::new(ExErrorKind::UnsupportedAttachment)
                    .with_op("parse")
                    .with_message(format!("Unsupported attachment type: {}", content_type))
            }
            DeskError::StorageUnavailable { reason } => {
                ExError::new(ExErrorKind::StorageUnavailable).with_message(reason)
            }
            DeskError::InvalidPeriod { raw } => ExError::new(ExErrorKind::InvalidPeriod)
                .with_op("parse_period")
                .with_message(format!("Invalid period: {}", raw)),
        }
    }
}
