//! # Wire Shapes
//!
//! The backend is not consistent about how it wraps collections. Each list
//! endpoint gets a sum type over the shapes seen in the wild; decoding picks
//! the first variant that fits, and anything else lands in `Unrecognized`,
//! which normalizes to an empty collection plus a diagnostic. Records inside
//! a recognised wrapper are decoded individually and bad ones are skipped.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{AnalysisReport, AnalysisRun, Equipment, MaintenanceLog, MonitoringReading};

/// `GET /equipments/list_all`. Probed in declaration order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EquipmentPayload {
    Bare(Vec<Value>),
    Data { data: Vec<Value> },
    Equipments { equipments: Vec<Value> },
    Items { items: Vec<Value> },
    Unrecognized(Value),
}

impl EquipmentPayload {
    pub fn into_records(self) -> Vec<Equipment> {
        const ENDPOINT: &str = "/equipments/list_all";
        match self {
            EquipmentPayload::Bare(rows)
            | EquipmentPayload::Data { data: rows }
            | EquipmentPayload::Equipments { equipments: rows }
            | EquipmentPayload::Items { items: rows } => decode_rows(ENDPOINT, rows),
            EquipmentPayload::Unrecognized(raw) => unrecognized(ENDPOINT, &raw),
        }
    }
}

/// The `/maintenance/logs*` family.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MaintenanceLogsPayload {
    Wrapped { maintenance_logs: Vec<Value> },
    Bare(Vec<Value>),
    Unrecognized(Value),
}

impl MaintenanceLogsPayload {
    pub fn into_records(self) -> Vec<MaintenanceLog> {
        const ENDPOINT: &str = "/maintenance/logs";
        match self {
            MaintenanceLogsPayload::Wrapped { maintenance_logs: rows } | MaintenanceLogsPayload::Bare(rows) => {
                decode_rows(ENDPOINT, rows)
            }
            MaintenanceLogsPayload::Unrecognized(raw) => unrecognized(ENDPOINT, &raw),
        }
    }
}

/// `POST /monitoring/{serial}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MonitoringPayload {
    Wrapped { monitoring_data: Vec<Value> },
    Bare(Vec<Value>),
    Unrecognized(Value),
}

impl MonitoringPayload {
    pub fn into_records(self) -> Vec<MonitoringReading> {
        const ENDPOINT: &str = "/monitoring";
        match self {
            MonitoringPayload::Wrapped { monitoring_data: rows } | MonitoringPayload::Bare(rows) => {
                decode_rows(ENDPOINT, rows)
            }
            MonitoringPayload::Unrecognized(raw) => unrecognized(ENDPOINT, &raw),
        }
    }
}

/// Rows are decoded one at a time so a single odd record only costs itself.
fn decode_rows<T: DeserializeOwned>(endpoint: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let records: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(endpoint, index, error = %err, "dropping malformed record");
                None
            }
        })
        .collect();
    if records.len() < total {
        warn!(endpoint, kept = records.len(), total, "some records were dropped");
    }
    records
}

fn unrecognized<T>(endpoint: &str, raw: &Value) -> Vec<T> {
    warn!(endpoint, shape = %shape_of(raw), "unexpected response structure, treating as empty");
    Vec::new()
}

fn shape_of(raw: &Value) -> String {
    match raw {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object{{{}}}", keys.join(","))
        }
        Value::Array(_) => "array".into(),
        Value::String(_) => "string".into(),
        Value::Number(_) => "number".into(),
        Value::Bool(_) => "bool".into(),
        Value::Null => "null".into(),
    }
}

/// Decodes a list body. Every `P` here ends in an `Unrecognized(Value)`
/// catch-all, so the only failure left is a body that is not JSON at all.
pub fn decode_list<P, T>(endpoint: &str, body: &[u8], into_records: fn(P) -> Vec<T>) -> Vec<T>
where
    P: DeserializeOwned,
{
    match serde_json::from_slice::<P>(body) {
        Ok(payload) => into_records(payload),
        Err(err) => {
            warn!(endpoint, error = %err, "response body is not usable JSON, treating as empty");
            Vec::new()
        }
    }
}

pub fn normalize_equipments(raw: Value) -> Vec<Equipment> {
    serde_json::from_value::<EquipmentPayload>(raw)
        .map(EquipmentPayload::into_records)
        .unwrap_or_default()
}

pub fn normalize_maintenance_logs(raw: Value) -> Vec<MaintenanceLog> {
    serde_json::from_value::<MaintenanceLogsPayload>(raw)
        .map(MaintenanceLogsPayload::into_records)
        .unwrap_or_default()
}

pub fn normalize_readings(raw: Value) -> Vec<MonitoringReading> {
    serde_json::from_value::<MonitoringPayload>(raw)
        .map(MonitoringPayload::into_records)
        .unwrap_or_default()
}

/// `GET /ai_analysis`: `{ "status": { "created_logs": [...] } }`.
#[derive(Debug, Deserialize)]
pub struct AnalysisEnvelope {
    pub status: AnalysisRun,
}

#[derive(Debug, Deserialize)]
pub struct ValidationStatus {
    pub analysis_report: Vec<AnalysisReport>,
}

/// `GET /ai_validation`: `{ "status": { "analysis_report": [...] } }`.
#[derive(Debug, Deserialize)]
pub struct ValidationEnvelope {
    pub status: ValidationStatus,
}

/// `POST /response`.
#[derive(Debug, Deserialize)]
pub struct ChatEnvelope {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body of a rejected write. FastAPI sends `detail` as a string for
/// handled errors and as a list for request validation failures; only the
/// string form is worth showing.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorEnvelope {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}
