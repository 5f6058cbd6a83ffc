//! Divergence handlers.
//!
//! ## Commands
//! - Recalculating the divergences of a campaign
//! - Resolving an alert
//!
//! ## Queries
//! - Summary counts per campaign
//! - Listing alerts with their answer snapshots
//!
//! ## Event handlers
//! - Recalculating when a respondent completes all assigned questions

mod divergence_trigger_handler;
mod get_divergence_summary;
mod list_divergence_alerts;
mod recalculate_divergences;
mod resolve_divergence_alert;

#[cfg(test)]
mod test_support;

// Commands
pub use recalculate_divergences::{
    RecalculateDivergencesCommand, RecalculateDivergencesHandler, RecalculationOutcome,
};
pub use resolve_divergence_alert::{ResolveDivergenceAlertCommand, ResolveDivergenceAlertHandler};

// Queries
pub use get_divergence_summary::{GetDivergenceSummaryHandler, GetDivergenceSummaryQuery};
pub use list_divergence_alerts::{ListDivergenceAlertsHandler, ListDivergenceAlertsQuery};

// Event handlers
pub use divergence_trigger_handler::DivergenceTriggerHandler;
