//! # HttpBackend
//!
//! `reqwest` implementation of `MaintenanceBackend` against the analysis
//! service's JSON API. Requests are sent once; there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use domains::wire::{
    decode_list, AnalysisEnvelope, ChatEnvelope, EquipmentPayload, ErrorEnvelope,
    MaintenanceLogsPayload, MonitoringPayload, ValidationEnvelope,
};
use domains::{
    AnalysisReport, AnalysisRun, Equipment, MaintenanceBackend, MaintenanceLog, MonitorError,
    MonitoringReading, NewMaintenanceLog, Operation, Result,
};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid backend base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> std::result::Result<Self, SetupError> {
        let invalid = |reason: String| SetupError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a hierarchical url".into()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: parsed,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends a request and maps transport errors and non-2xx statuses.
    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|err| {
            warn!(%operation, error = %err, "backend request failed");
            MonitorError::network(operation, None)
        })?;

        let status = response.status();
        debug!(%operation, status = status.as_u16(), "backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|body| body.detail_text());
        warn!(%operation, status = status.as_u16(), ?detail, "backend rejected request");
        Err(MonitorError::NetworkFailure {
            operation,
            status: Some(status.as_u16()),
            detail,
        })
    }

    async fn body(&self, operation: Operation, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = self.send(operation, request).await?;
        let bytes = response.bytes().await.map_err(|err| {
            warn!(%operation, error = %err, "failed reading backend response");
            MonitorError::network(operation, None)
        })?;
        Ok(bytes.to_vec())
    }

    /// Fetches a list endpoint. Shape problems degrade to an empty list.
    async fn list<P, T>(
        &self,
        operation: Operation,
        request: RequestBuilder,
        into_records: fn(P) -> Vec<T>,
    ) -> Result<Vec<T>>
    where
        P: DeserializeOwned,
    {
        let body = self.body(operation, request).await?;
        Ok(decode_list(operation.as_str(), &body, into_records))
    }

    /// Fetches an endpoint whose shape matters. Shape problems are errors.
    async fn typed<T: DeserializeOwned>(&self, operation: Operation, request: RequestBuilder) -> Result<T> {
        let body = self.body(operation, request).await?;
        serde_json::from_slice(&body).map_err(|err| {
            warn!(%operation, error = %err, "unexpected response shape");
            MonitorError::MalformedResponse {
                operation,
                reason: err.to_string(),
            }
        })
    }
}

#[async_trait]
impl MaintenanceBackend for HttpBackend {
    async fn list_equipments(&self) -> Result<Vec<Equipment>> {
        let req = self.client.get(self.endpoint(&["equipments", "list_all"]));
        self.list(Operation::ListEquipments, req, EquipmentPayload::into_records)
            .await
    }

    async fn list_open_logs(&self) -> Result<Vec<MaintenanceLog>> {
        let req = self.client.get(self.endpoint(&["maintenance", "logs", "open"]));
        self.list(Operation::ListOpenLogs, req, MaintenanceLogsPayload::into_records)
            .await
    }

    async fn list_all_logs(&self) -> Result<Vec<MaintenanceLog>> {
        let req = self.client.get(self.endpoint(&["maintenance", "logs"]));
        self.list(Operation::ListAllLogs, req, MaintenanceLogsPayload::into_records)
            .await
    }

    async fn equipment_logs(&self, serial: &str) -> Result<Vec<MaintenanceLog>> {
        let req = self.client.post(self.endpoint(&["maintenance", "logs", serial]));
        self.list(Operation::EquipmentLogs, req, MaintenanceLogsPayload::into_records)
            .await
    }

    async fn monitoring_readings(&self, serial: &str) -> Result<Vec<MonitoringReading>> {
        let req = self.client.post(self.endpoint(&["monitoring", serial]));
        self.list(Operation::MonitoringReadings, req, MonitoringPayload::into_records)
            .await
    }

    async fn add_log(&self, log: NewMaintenanceLog) -> Result<()> {
        let req = self
            .client
            .put(self.endpoint(&["maintenance", "logs", "add"]))
            .json(&log);
        self.send(Operation::AddLog, req).await?;
        Ok(())
    }

    async fn run_analysis(&self) -> Result<AnalysisRun> {
        let req = self.client.get(self.endpoint(&["ai_analysis"]));
        let envelope: AnalysisEnvelope = self.typed(Operation::RunAnalysis, req).await?;
        Ok(envelope.status)
    }

    async fn run_validation(&self) -> Result<Vec<AnalysisReport>> {
        let req = self.client.get(self.endpoint(&["ai_validation"]));
        let envelope: ValidationEnvelope = self.typed(Operation::RunValidation, req).await?;
        Ok(envelope.status.analysis_report)
    }

    async fn chat(&self, input: &str) -> Result<Option<String>> {
        let req = self
            .client
            .post(self.endpoint(&["response"]))
            .query(&[("input", input)])
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let envelope: ChatEnvelope = self.typed(Operation::Chat, req).await?;
        Ok(envelope.message.filter(|m| !m.is_empty()))
    }
}
