//! # Domain Models
//!
//! Records as the backend reports them. The backend is loose about nulls and
//! id types, so every string field tolerates `null` and ids accept either a
//! number or a string.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// `raised_by` value the backend stamps on logs created by its own analysis.
pub const AI_SYSTEM: &str = "AI System";

/// Server-assigned identifier; numeric for logs, textual for some equipment rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Text(String::new())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Deserializes `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A monitored asset. `serial` is the join key everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub installation_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    /// `operational`, `warning`, `critical`, or anything else the backend invents
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub maintenance_status: String,
}

/// A reported issue against one piece of equipment.
///
/// A log is *open* until `date_resolved` carries a non-empty value; after
/// that it is history and the console never touches it again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub raised_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub equipment_serial: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_reported: String,
    #[serde(default)]
    pub date_predicted: Option<String>,
    #[serde(default)]
    pub date_resolved: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

impl MaintenanceLog {
    /// The resolution date, when present and non-empty.
    pub fn resolved_on(&self) -> Option<&str> {
        self.date_resolved
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_on().is_some()
    }

    pub fn is_ai_generated(&self) -> bool {
        self.raised_by.as_deref() == Some(AI_SYSTEM)
    }

    /// Date shown on the schedule: the predicted date, else the reported one.
    pub fn scheduled_date(&self) -> &str {
        self.date_predicted
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.date_reported)
    }

    pub fn severity_text(&self) -> &str {
        self.severity.as_deref().unwrap_or_default()
    }
}

/// A timestamped sensor sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringReading {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub equipment_serial: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reading_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub threshold_min: Option<f64>,
    #[serde(default)]
    pub threshold_max: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub serial: String,
}

/// One entry of a validation pass. Lives only in process memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub equipment_details: EquipmentDetails,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_maintenance: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ai_summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub validation_feedback: String,
}

/// Result of a prediction run (`GET /ai_analysis`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    /// Logs the backend created; the console only cares whether there were any.
    #[serde(default)]
    pub created_logs: Vec<serde_json::Value>,
}

/// Payload for `PUT /maintenance/logs/add`. Dates are `yyyy-MM-dd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaintenanceLog {
    pub raised_by: String,
    pub equipment_serial: String,
    pub issue_description: String,
    pub date_reported: String,
    pub severity: String,
    pub date_predicted: Option<String>,
}
