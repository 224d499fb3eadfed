//! # ApiError
//!
//! Maps console failures onto HTTP responses. Every body is
//! `{ "error": <operator message>, "title": <notice title> }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::MonitorError;
use serde_json::json;
use services::{Activity, Notice};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// An operator action failed.
    #[error("{activity:?} failed: {source}")]
    Action {
        activity: Activity,
        #[source]
        source: MonitorError,
    },

    #[error("failed to render page: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to encode metrics")]
    Metrics(#[from] std::fmt::Error),
}

impl ApiError {
    pub fn action(activity: Activity) -> impl FnOnce(MonitorError) -> Self {
        move |source| ApiError::Action { activity, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Action { source, .. } => match source {
                MonitorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MonitorError::NetworkFailure { .. } | MonitorError::MalformedResponse { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ApiError::Render(_) | ApiError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Action { activity, source } => {
                let notice = Notice::for_failure(*activity, source);
                json!({ "error": notice.description, "title": notice.title })
            }
            other => {
                error!(error = %other, "request failed");
                json!({ "error": "Internal server error", "title": "Error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Operation, ValidationError};

    #[test]
    fn statuses_follow_the_failure_kind() {
        let validation = ApiError::action(Activity::Submission)(MonitorError::Validation(
            ValidationError::UnknownSeverity("urgent".into()),
        ));
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let network =
            ApiError::action(Activity::Prediction)(MonitorError::network(Operation::RunAnalysis, None));
        assert_eq!(network.status(), StatusCode::BAD_GATEWAY);

        let malformed = ApiError::action(Activity::BulkAnalysis)(MonitorError::MalformedResponse {
            operation: Operation::RunValidation,
            reason: "missing field `status`".into(),
        });
        assert_eq!(malformed.status(), StatusCode::BAD_GATEWAY);
    }
}
