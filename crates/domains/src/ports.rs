//! # Ports
//!
//! The console talks to the analysis backend only through this trait. The
//! HTTP implementation lives in `backend-adapters`; tests use the mockall
//! double exported under the `testing` feature.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AnalysisReport, AnalysisRun, Equipment, MaintenanceLog, MonitoringReading, NewMaintenanceLog,
};

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MaintenanceBackend: Send + Sync {
    /// `GET /equipments/list_all`
    async fn list_equipments(&self) -> Result<Vec<Equipment>>;

    /// `GET /maintenance/logs/open`
    async fn list_open_logs(&self) -> Result<Vec<MaintenanceLog>>;

    /// `GET /maintenance/logs`
    async fn list_all_logs(&self) -> Result<Vec<MaintenanceLog>>;

    /// `POST /maintenance/logs/{serial}`
    async fn equipment_logs(&self, serial: &str) -> Result<Vec<MaintenanceLog>>;

    /// `POST /monitoring/{serial}`
    async fn monitoring_readings(&self, serial: &str) -> Result<Vec<MonitoringReading>>;

    /// `PUT /maintenance/logs/add`
    async fn add_log(&self, log: NewMaintenanceLog) -> Result<()>;

    /// `GET /ai_analysis`
    async fn run_analysis(&self) -> Result<AnalysisRun>;

    /// `GET /ai_validation`
    async fn run_validation(&self) -> Result<Vec<AnalysisReport>>;

    /// `POST /response?input=...`. `None` when the reply carried no message.
    async fn chat(&self, input: &str) -> Result<Option<String>>;
}
