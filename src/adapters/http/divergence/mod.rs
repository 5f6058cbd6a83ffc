//! Divergence HTTP adapter module.
//!
//! Provides REST API endpoints for recalculating, listing, summarising and
//! resolving divergence alerts.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AdminIdentity, DivergenceAppState, ADMIN_ID_HEADER};
pub use routes::divergence_routes;
