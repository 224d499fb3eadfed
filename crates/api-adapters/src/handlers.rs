//! # Handlers
//!
//! Each handler reads or triggers one console operation through
//! `MaintenanceService`. Reads never fail at the HTTP level: load errors
//! travel inside the view as notices next to whatever cached data exists.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use domains::LogDraft;
use serde::{Deserialize, Serialize};
use services::console::{EquipmentDetail, HistoryView, OperatorLogsView, ReadingRow};
use services::{Activity, ChatMessage, ChatTurn, DashboardQuery, DashboardView, Notice};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::templates::{DashboardTemplate, HistoryTemplate};

pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, ApiError> {
    let view = state.service.dashboard(query).await;
    let html = DashboardTemplate::new(&view, query).render()?;
    Ok(Html(html))
}

/// The dashboard's "Predict Maintenance" button. Runs the prediction, then
/// renders the refreshed dashboard with the outcome as its first notice.
pub async fn predict_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let outcome = state.service.predict_maintenance().await;
    state.metrics.record(Activity::Prediction, outcome.is_ok());
    let notice = outcome.unwrap_or_else(|err| Notice::for_failure(Activity::Prediction, &err));

    let query = DashboardQuery::default();
    let mut view = state.service.dashboard(query).await;
    view.notices.insert(0, notice);
    let html = DashboardTemplate::new(&view, query).render()?;
    Ok(Html(html))
}

pub async fn history_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let view = state.service.past_maintenance().await;
    let html = HistoryTemplate::new(&view).render()?;
    Ok(Html(html))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<DashboardView> {
    Json(state.service.dashboard(query).await)
}

pub async fn history(State(state): State<AppState>) -> Json<HistoryView> {
    Json(state.service.past_maintenance().await)
}

pub async fn equipment_monitoring(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Json<EquipmentDetail<ReadingRow>> {
    Json(state.service.equipment_monitoring(&serial).await)
}

pub async fn equipment_maintenance(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Json<EquipmentDetail<domains::MaintenanceLog>> {
    Json(state.service.equipment_maintenance(&serial).await)
}

pub async fn operator_logs(State(state): State<AppState>) -> Json<OperatorLogsView> {
    Json(state.service.operator_logs().await)
}

pub async fn submit_log(
    State(state): State<AppState>,
    Json(draft): Json<LogDraft>,
) -> Result<(StatusCode, Json<Notice>), ApiError> {
    let outcome = state.service.submit_log(&draft).await;
    state.metrics.record(Activity::Submission, outcome.is_ok());
    let notice = outcome.map_err(ApiError::action(Activity::Submission))?;
    Ok((StatusCode::CREATED, Json(notice)))
}

pub async fn predict(State(state): State<AppState>) -> Result<Json<Notice>, ApiError> {
    let outcome = state.service.predict_maintenance().await;
    state.metrics.record(Activity::Prediction, outcome.is_ok());
    Ok(Json(outcome.map_err(ApiError::action(Activity::Prediction))?))
}

pub async fn validate(State(state): State<AppState>) -> Result<Json<Notice>, ApiError> {
    let outcome = state.service.run_bulk_validation().await;
    state.metrics.record(Activity::BulkAnalysis, outcome.is_ok());
    Ok(Json(outcome.map_err(ApiError::action(Activity::BulkAnalysis))?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatSessionQuery {
    pub session: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatTranscript {
    pub session: Uuid,
    pub messages: Vec<ChatMessage>,
}

/// The transcript of the caller's session. A missing or unknown session id
/// starts a new one, returned alongside the greeting.
pub async fn chat_transcript(
    State(state): State<AppState>,
    Query(query): Query<ChatSessionQuery>,
) -> Json<ChatTranscript> {
    let (session, transcript) = state.chat.open(query.session);
    let messages = transcript.lock().await.messages().to_vec();
    Json(ChatTranscript { session, messages })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub session: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub session: Uuid,
    #[serde(flatten)]
    pub turn: ChatTurn,
}

/// Asks the assistant. Blank input is ignored with `204 No Content`.
///
/// The transcript lock is released while the backend answers, so the
/// transcript stays readable during a slow reply.
pub async fn ask_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if request.input.trim().is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let (session, transcript) = state.chat.open(request.session);
    let Some(question) = transcript.lock().await.push_question(&request.input) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let answer = state.service.ask_assistant(&question).await;
    state.metrics.record(Activity::Chat, answer.is_ok());

    let turn = transcript.lock().await.push_answer(answer);
    Json(ChatReply { session, turn }).into_response()
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.encode()?;
    debug!(bytes = body.len(), "metrics scraped");
    Ok((
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    ))
}
