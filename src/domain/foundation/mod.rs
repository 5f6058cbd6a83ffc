//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types and the event envelope
//! that form the vocabulary of the survey and divergence domains.

mod errors;
mod events;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{AdminId, AlertId, AssignmentId, CampaignId, QuestionId, RespondentId};
pub use timestamp::Timestamp;
