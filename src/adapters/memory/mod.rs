//! In-memory adapters for tests and local development.

mod divergence_alert_repository;
mod survey_store;

pub use divergence_alert_repository::InMemoryDivergenceAlertRepository;
pub use survey_store::InMemorySurveyStore;

use crate::domain::foundation::{DomainError, ErrorCode};

pub(crate) fn poisoned(name: &str) -> DomainError {
    DomainError::new(ErrorCode::InternalError, format!("{} lock poisoned", name))
}
