//! Error responses shared by all HTTP adapters.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn from_domain(error: &DomainError) -> Self {
        let details = if error.details.is_empty() {
            None
        } else {
            serde_json::to_value(&error.details).ok()
        };
        Self {
            code: error.code.to_string(),
            message: error.message.clone(),
            details,
        }
    }
}

/// API error that implements IntoResponse.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Domain(DomainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Domain(e) => status_for(e.code),
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::AlertNotFound | ErrorCode::AssignmentNotFound => StatusCode::NOT_FOUND,
        ErrorCode::AlertAlreadyResolved | ErrorCode::AnswerAlreadySubmitted => {
            StatusCode::CONFLICT
        }
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApiError::Domain(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(msg) => ErrorResponse::bad_request(msg),
            ApiError::Unauthorized(msg) => ErrorResponse::unauthorized(msg),
            ApiError::Domain(e) => {
                if e.code.is_infrastructure() {
                    error!(code = %e.code, error = %e.message, "Request failed");
                }
                ErrorResponse::from_domain(&e)
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_codes_map_to_statuses() {
        let cases = [
            (ErrorCode::ValidationFailed, StatusCode::BAD_REQUEST),
            (ErrorCode::AlertNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::AssignmentNotFound, StatusCode::NOT_FOUND),
            (ErrorCode::AlertAlreadyResolved, StatusCode::CONFLICT),
            (ErrorCode::AnswerAlreadySubmitted, StatusCode::CONFLICT),
            (ErrorCode::DatabaseError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (code, status) in cases {
            let err = ApiError::from(DomainError::new(code, "boom"));
            assert_eq!(err.status(), status, "{}", code);
        }
    }

    #[test]
    fn error_body_uses_domain_code() {
        let err = DomainError::validation("answers", "No answers submitted");
        let body = ErrorResponse::from_domain(&err);

        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.message, "No answers submitted");
        assert_eq!(body.details, Some(serde_json::json!({ "field": "answers" })));
    }

    #[test]
    fn details_are_omitted_when_empty() {
        let body = ErrorResponse::from_domain(&DomainError::new(ErrorCode::AlertNotFound, "gone"));
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("details").is_none());
    }
}
