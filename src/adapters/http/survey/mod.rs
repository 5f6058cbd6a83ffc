//! Survey HTTP adapter module.
//!
//! Provides the answer submission endpoint.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::SurveyAppState;
pub use routes::survey_routes;
