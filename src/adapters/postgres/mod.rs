//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresCampaignResponseReader` - Answered assignments of a campaign
//! - `PostgresDivergenceAlertRepository` - Divergence alerts with JSONB snapshots
//! - `PostgresSurveyAnswerRepository` - Assignment lookup and answer storage
//!
//! The schema lives in `migrations/` at the crate root.

mod campaign_response_reader;
mod divergence_alert_repository;
mod survey_answer_repository;

pub use campaign_response_reader::PostgresCampaignResponseReader;
pub use divergence_alert_repository::PostgresDivergenceAlertRepository;
pub use survey_answer_repository::PostgresSurveyAnswerRepository;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::survey::AnswerType;

fn parse_answer_type(s: &str) -> Result<AnswerType, DomainError> {
    s.parse().map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid answer_type value: {}", e))
    })
}
