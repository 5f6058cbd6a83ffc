//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Survey and Divergence Ports
//!
//! - `CampaignResponseReader` - Answered assignments of a campaign
//! - `DivergenceAlertRepository` - Divergence alert persistence
//! - `SurveyAnswerRepository` - Assignment lookup and answer storage
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events

mod campaign_response_reader;
mod divergence_alert_repository;
mod event_publisher;
mod event_subscriber;
mod survey_answer_repository;

pub use campaign_response_reader::CampaignResponseReader;
pub use divergence_alert_repository::DivergenceAlertRepository;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use survey_answer_repository::SurveyAnswerRepository;
