//! Divergence domain - detects disagreement between respondents.
//!
//! The flow for one campaign:
//!
//! 1. [`ResponseAggregator`] groups answered assignments by question
//! 2. [`DivergenceAnalyzer`] assesses each group according to its answer type
//! 3. [`DivergenceAlert`] records the result, one open alert per question
//!
//! Everything here is pure; reading and writing happen in the application
//! layer through ports.

mod aggregator;
mod alert;
mod analyzer;
mod events;
mod severity;
pub mod statistics;
mod summary;

pub use aggregator::{
    AnsweredAssignmentRow, QuestionResponses, ResponseAggregator, ResponseSnapshot,
    MIN_RESPONDENTS,
};
pub use alert::{AlertWrite, DivergenceAlert};
pub use analyzer::{DivergenceAnalyzer, DivergenceAssessment};
pub use events::{
    DivergenceAlertRaised, DivergenceAlertRefreshed, DivergenceAlertResolved, ALERT_RAISED_EVENT,
    ALERT_REFRESHED_EVENT, ALERT_RESOLVED_EVENT,
};
pub use severity::AlertSeverity;
pub use summary::{DivergenceSummary, SeverityBreakdown};
