//! # MaintenanceService
//!
//! Orchestrates the console: assembles the dashboard views from cached
//! collections and runs the operator's actions against the backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use domains::{
    AnalysisReport, Badge, EquipmentStatus, LogDraft, MaintenanceBackend, MaintenanceLog,
    MonitoringReading, ReadingTone, Result,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::activity::{Activity, ActivityTracker};
use crate::cache::QueryKey;
use crate::fetch::{FetchLayer, QueryResult};
use crate::notice::Notice;
use crate::ranking::{
    dedupe_analyzed_logs, preview, rank_closed_items, rank_open_items, EquipmentIndex,
    HistoryItem, LogEntryView, ScheduleItem,
};
use crate::summary::{derive_summary_counts, SummaryCounts};

#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    /// Rows shown on the dashboard before "show all" is toggled.
    pub preview_size: usize,
    pub cache_ttl: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            preview_size: 3,
            cache_ttl: Duration::from_secs(30),
        }
    }
}

/// The dashboard's "show all" toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub show_all_schedule: bool,
    #[serde(default)]
    pub show_all_equipment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentRow {
    pub serial: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub location: String,
    pub status: Badge,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub summary: SummaryCounts,
    pub schedule: Vec<ScheduleItem>,
    pub schedule_total: usize,
    pub equipment: Vec<EquipmentRow>,
    pub equipment_total: usize,
    pub predicting: bool,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub items: Vec<HistoryItem>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRow {
    #[serde(flatten)]
    pub reading: MonitoringReading,
    pub tone: ReadingTone,
}

/// One machine's records, as shown in the detail dialogs.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentDetail<T> {
    pub serial: String,
    pub equipment: String,
    pub records: Vec<T>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorLogsView {
    pub entries: Vec<LogEntryView>,
    pub analyzing: bool,
    pub submitting: bool,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Default)]
struct ReportSlot {
    generation: u64,
    entries: Arc<Vec<AnalysisReport>>,
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct MaintenanceService {
    fetch: FetchLayer,
    activity: ActivityTracker,
    preview_size: usize,
    report: RwLock<ReportSlot>,
    report_generation: AtomicU64,
    today: Clock,
}

fn load_notices<T>(result: &QueryResult<T>, notices: &mut Vec<Notice>) {
    if let Some(err) = &result.error {
        notices.push(Notice::from_error("Error", err));
    }
}

impl MaintenanceService {
    pub fn new(backend: Arc<dyn MaintenanceBackend>, settings: ServiceSettings) -> Self {
        Self {
            fetch: FetchLayer::new(backend, settings.cache_ttl),
            activity: ActivityTracker::new(),
            preview_size: settings.preview_size,
            report: RwLock::new(ReportSlot::default()),
            report_generation: AtomicU64::new(0),
            today: Box::new(|| Local::now().date_naive()),
        }
    }

    /// Replaces the clock used to stamp `date_reported` on submissions.
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    pub fn fetch(&self) -> &FetchLayer {
        &self.fetch
    }

    pub async fn dashboard(&self, query: DashboardQuery) -> DashboardView {
        let (equipment, open, all) = tokio::join!(
            self.fetch.equipments(),
            self.fetch.open_logs(),
            self.fetch.all_logs()
        );

        let index = EquipmentIndex::from_equipment(equipment.records());
        let limit = (!query.show_all_schedule).then_some(self.preview_size);
        let schedule = rank_open_items(open.records(), &index, limit);

        let rows: Vec<EquipmentRow> = equipment
            .records()
            .iter()
            .map(|eq| EquipmentRow {
                serial: eq.serial.clone(),
                name: eq.name.clone(),
                manufacturer: eq.manufacturer.clone(),
                model: eq.model.clone(),
                location: eq.location.clone(),
                status: EquipmentStatus::classify(&eq.status).badge(),
            })
            .collect();

        let mut notices = Vec::new();
        load_notices(&equipment, &mut notices);
        load_notices(&open, &mut notices);
        load_notices(&all, &mut notices);

        DashboardView {
            summary: derive_summary_counts(equipment.loaded(), open.loaded(), all.loaded()),
            schedule,
            schedule_total: open.records().len(),
            equipment: preview(&rows, query.show_all_equipment, self.preview_size),
            equipment_total: rows.len(),
            predicting: self.activity.is_busy(Activity::Prediction),
            notices,
        }
    }

    pub async fn past_maintenance(&self) -> HistoryView {
        let (equipment, all) = tokio::join!(self.fetch.equipments(), self.fetch.all_logs());
        let index = EquipmentIndex::from_equipment(equipment.records());

        let mut notices = Vec::new();
        load_notices(&all, &mut notices);

        HistoryView {
            items: rank_closed_items(all.records(), &index),
            notices,
        }
    }

    pub async fn equipment_monitoring(&self, serial: &str) -> EquipmentDetail<ReadingRow> {
        let (equipment, readings) = tokio::join!(
            self.fetch.equipments(),
            self.fetch.monitoring_readings(serial)
        );
        let index = EquipmentIndex::from_equipment(equipment.records());

        EquipmentDetail {
            serial: serial.to_string(),
            equipment: index.display_name(serial).to_string(),
            records: readings
                .records()
                .iter()
                .map(|r| ReadingRow {
                    tone: ReadingTone::classify(&r.status),
                    reading: r.clone(),
                })
                .collect(),
            error: readings.error.as_ref().map(|e| e.user_message()),
        }
    }

    pub async fn equipment_maintenance(&self, serial: &str) -> EquipmentDetail<MaintenanceLog> {
        let (equipment, logs) = tokio::join!(
            self.fetch.equipments(),
            self.fetch.equipment_logs(serial)
        );
        let index = EquipmentIndex::from_equipment(equipment.records());

        EquipmentDetail {
            serial: serial.to_string(),
            equipment: index.display_name(serial).to_string(),
            records: logs.records().to_vec(),
            error: logs.error.as_ref().map(|e| e.user_message()),
        }
    }

    /// Operator-submitted open logs against the latest validation report.
    pub async fn operator_logs(&self) -> OperatorLogsView {
        let open = self.fetch.open_logs().await;
        let report = self.latest_report().await;

        let mut notices = Vec::new();
        load_notices(&open, &mut notices);

        OperatorLogsView {
            entries: dedupe_analyzed_logs(open.records(), &report),
            analyzing: self.activity.is_busy(Activity::BulkAnalysis),
            submitting: self.activity.is_busy(Activity::Submission),
            notices,
        }
    }

    pub async fn latest_report(&self) -> Arc<Vec<AnalysisReport>> {
        Arc::clone(&self.report.read().await.entries)
    }

    /// Validates and submits a new log. Nothing is shown optimistically; the
    /// open-log and history caches are invalidated once the backend accepts it.
    pub async fn submit_log(&self, draft: &LogDraft) -> Result<Notice> {
        let payload = draft.validate((self.today)())?;
        let _busy = self.activity.start(Activity::Submission);

        let serial = payload.equipment_serial.clone();
        self.fetch.backend().add_log(payload).await?;
        info!(%serial, "maintenance log added");

        let cache = self.fetch.cache();
        cache.invalidate_logs();
        cache.invalidate(&QueryKey::EquipmentLogs(serial));

        Ok(Notice::info("Success", "Maintenance log added successfully"))
    }

    /// Asks the backend to predict maintenance needs. It may create new open
    /// logs, so the log caches are invalidated afterwards.
    pub async fn predict_maintenance(&self) -> Result<Notice> {
        let _busy = self.activity.start(Activity::Prediction);

        let run = self.fetch.backend().run_analysis().await?;
        info!(created = run.created_logs.len(), "prediction run complete");
        self.fetch.cache().invalidate_logs();

        let description = if run.created_logs.is_empty() {
            "Seems that equipments are in good state or already maintenance has been scheduled"
        } else {
            "AI prediction analysis has been successfully completed."
        };
        Ok(Notice::info("Analysis Complete", description))
    }

    /// Runs a validation pass over the open logs and keeps its report as the
    /// latest one. The previous report is cleared when the pass starts; a
    /// pass superseded by a newer one does not store its result.
    pub async fn run_bulk_validation(&self) -> Result<Notice> {
        let _busy = self.activity.start(Activity::BulkAnalysis);

        let generation = self.report_generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut slot = self.report.write().await;
            slot.generation = generation;
            slot.entries = Arc::new(Vec::new());
        }

        let reports = self.fetch.backend().run_validation().await?;
        let count = reports.len();

        let mut slot = self.report.write().await;
        if slot.generation == generation {
            slot.entries = Arc::new(reports);
        } else {
            info!(generation, "validation result superseded, discarding");
        }

        Ok(Notice::info(
            "Analysis Complete",
            format!("Successfully analyzed logs for {count} open maintenance cases."),
        ))
    }

    pub async fn ask_assistant(&self, question: &str) -> Result<Option<String>> {
        let _busy = self.activity.start(Activity::Chat);
        self.fetch.backend().chat(question).await
    }
}
