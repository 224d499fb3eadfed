//! Transient, dismissable notifications returned by console actions.

use domains::{MonitorError, ValidationError};
use serde::Serialize;

use crate::activity::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub tone: Tone,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: Tone::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: Tone::Destructive,
        }
    }

    /// A failure notice carrying the error's operator-facing message.
    pub fn from_error(title: impl Into<String>, err: &MonitorError) -> Self {
        Self::destructive(title, err.user_message())
    }

    /// The notice shown when an operator action fails.
    pub fn for_failure(activity: Activity, err: &MonitorError) -> Self {
        let title = match (activity, err) {
            (_, MonitorError::Validation(ValidationError::MissingFields(_))) => "Missing Information",
            (_, MonitorError::Validation(_)) => "Invalid Input",
            (Activity::Prediction | Activity::BulkAnalysis, _) => "Analysis Failed",
            (Activity::Submission | Activity::Chat, _) => "Error",
        };
        Self::from_error(title, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::Operation;

    #[test]
    fn failure_titles_follow_the_action() {
        let err = MonitorError::network(Operation::RunAnalysis, Some(500));
        let notice = Notice::for_failure(Activity::Prediction, &err);
        assert_eq!(notice.title, "Analysis Failed");
        assert_eq!(notice.tone, Tone::Destructive);

        let err = MonitorError::Validation(ValidationError::MissingFields(Vec::new()));
        assert_eq!(Notice::for_failure(Activity::Submission, &err).title, "Missing Information");
    }
}
