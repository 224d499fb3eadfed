//! Per-operation in-flight flags backing the busy indicators.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Submission,
    BulkAnalysis,
    Prediction,
    Chat,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Submission => "submission",
            Activity::BulkAnalysis => "bulk_analysis",
            Activity::Prediction => "prediction",
            Activity::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    in_flight: Arc<DashMap<Activity, usize>>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `activity` busy until the returned guard is dropped.
    pub fn start(&self, activity: Activity) -> BusyGuard {
        *self.in_flight.entry(activity).or_insert(0) += 1;
        BusyGuard {
            activity,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn is_busy(&self, activity: Activity) -> bool {
        self.in_flight.get(&activity).is_some_and(|n| *n > 0)
    }
}

#[must_use = "the activity is only busy while the guard is alive"]
pub struct BusyGuard {
    activity: Activity,
    in_flight: Arc<DashMap<Activity, usize>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(mut n) = self.in_flight.get_mut(&self.activity) {
            *n = n.saturating_sub(1);
        }
    }
}
