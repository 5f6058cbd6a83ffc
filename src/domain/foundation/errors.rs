//! Domain error types.
//!
//! [`DomainError`] is what every port and handler returns. Its [`ErrorCode`]
//! drives the HTTP status mapping, so codes are grouped by how a caller
//! should react rather than by where they were raised.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Parsing failure for a value object (an answer type, a severity label).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidFormat { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Input rejected before any state was touched.
    ValidationFailed,
    AlertNotFound,
    /// Unknown assignment, or one owned by another respondent.
    AssignmentNotFound,
    AlertAlreadyResolved,
    AnswerAlreadySubmitted,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// Wire form, e.g. `"ALERT_NOT_FOUND"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::AlertNotFound => "ALERT_NOT_FOUND",
            Self::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            Self::AlertAlreadyResolved => "ALERT_ALREADY_RESOLVED",
            Self::AnswerAlreadySubmitted => "ANSWER_ALREADY_SUBMITTED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// True for failures the caller cannot fix by changing the request.
    pub fn is_infrastructure(self) -> bool {
        matches!(self, Self::DatabaseError | Self::InternalError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coded error with a human message and free-form string details.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// `ValidationFailed` with the field recorded under the `"field"` detail.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    /// `DatabaseError` whose message is `"{context}: {err}"`.
    pub fn database(context: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{context}: {err}"))
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}
