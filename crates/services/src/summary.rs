//! Headline counts for the dashboard cards.

use domains::{Equipment, MaintenanceLog};
use serde::Serialize;

use crate::ranking::is_alert_severity;

/// Status the full-history endpoint reports for finished work.
const CLOSED_STATUS: &str = "closed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub active: usize,
    pub pending: usize,
    pub critical: usize,
    pub completed: usize,
}

/// Each collection is optional: one that failed to load counts as zero.
pub fn derive_summary_counts(
    equipment: Option<&[Equipment]>,
    open_logs: Option<&[MaintenanceLog]>,
    all_logs: Option<&[MaintenanceLog]>,
) -> SummaryCounts {
    SummaryCounts {
        active: equipment.map_or(0, <[Equipment]>::len),
        pending: open_logs.map_or(0, <[MaintenanceLog]>::len),
        critical: open_logs.map_or(0, |logs| {
            logs.iter()
                .filter(|l| is_alert_severity(l.severity.as_deref()))
                .count()
        }),
        completed: all_logs.map_or(0, |logs| {
            logs.iter()
                .filter(|l| l.status.as_deref() == Some(CLOSED_STATUS))
                .count()
        }),
    }
}
