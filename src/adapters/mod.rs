//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - In-process event bus
//! - `http` - REST API (axum)
//! - `memory` - In-memory repositories for tests and local development
//! - `postgres` - PostgreSQL persistence (sqlx)

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;

pub use events::InMemoryEventBus;
pub use memory::{InMemoryDivergenceAlertRepository, InMemorySurveyStore};
pub use postgres::{
    PostgresCampaignResponseReader, PostgresDivergenceAlertRepository,
    PostgresSurveyAnswerRepository,
};
