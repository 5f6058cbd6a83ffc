//! Per-campaign divergence counts.

use serde::{Deserialize, Serialize};

use super::{AlertSeverity, DivergenceAlert};

/// Alert counts per severity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityBreakdown {
    pub fn count(&mut self, severity: AlertSeverity) {
        match severity {
            AlertSeverity::Critical => self.critical += 1,
            AlertSeverity::High => self.high += 1,
            AlertSeverity::Medium => self.medium += 1,
            AlertSeverity::Low => self.low += 1,
        }
    }
}

/// Totals over every alert of a campaign, resolved or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceSummary {
    #[serde(rename = "total_alerts")]
    pub total: u32,
    pub unresolved: u32,
    pub by_severity: SeverityBreakdown,
}

impl DivergenceSummary {
    pub fn from_alerts<'a>(alerts: impl IntoIterator<Item = &'a DivergenceAlert>) -> Self {
        alerts.into_iter().fold(Self::default(), |mut summary, alert| {
            summary.total += 1;
            if !alert.is_resolved {
                summary.unresolved += 1;
            }
            summary.by_severity.count(alert.severity);
            summary
        })
    }
}
