//! # api-adapters
//!
//! The HTTP surface of the maintenance console: two server-rendered pages,
//! a JSON API mirroring every dashboard panel and action, health and
//! Prometheus endpoints.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod templates;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use metrics::Metrics;
pub use state::AppState;

/// Builds the console router.
///
/// The binary mounts this at `/`; tests drive it directly with
/// `tower::ServiceExt::oneshot`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/history", get(handlers::history))
        .route("/equipment/{serial}/monitoring", get(handlers::equipment_monitoring))
        .route("/equipment/{serial}/maintenance", get(handlers::equipment_maintenance))
        .route("/operator-logs", get(handlers::operator_logs))
        .route("/logs", axum::routing::post(handlers::submit_log))
        .route("/predict", axum::routing::post(handlers::predict))
        .route("/validation", axum::routing::post(handlers::validate))
        .route("/chat", get(handlers::chat_transcript).post(handlers::ask_chat));

    Router::new()
        .route("/", get(handlers::dashboard_page))
        .route("/predict", axum::routing::post(handlers::predict_page))
        .route("/history", get(handlers::history_page))
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
