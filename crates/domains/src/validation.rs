//! Validation of the add-log form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::format_wire_date;
use crate::models::NewMaintenanceLog;
use crate::severity::classify_severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Equipment,
    Description,
    Severity,
    ReportedBy,
    PredictedDate,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all required fields (Equipment, Description, Severity, Reported By, Predicted Date)")]
    MissingFields(Vec<FormField>),

    #[error("unknown severity '{0}', expected one of low, medium, high, critical")]
    UnknownSeverity(String),
}

/// What the operator typed into the add-log form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogDraft {
    #[serde(default)]
    pub equipment_serial: String,
    #[serde(default)]
    pub issue_description: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub raised_by: String,
    #[serde(default)]
    pub date_predicted: Option<NaiveDate>,
}

impl LogDraft {
    /// Checks every required field and builds the payload, stamping
    /// `date_reported` with `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<NewMaintenanceLog, ValidationError> {
        let mut missing = Vec::new();
        if self.equipment_serial.trim().is_empty() {
            missing.push(FormField::Equipment);
        }
        if self.issue_description.trim().is_empty() {
            missing.push(FormField::Description);
        }
        if self.severity.trim().is_empty() {
            missing.push(FormField::Severity);
        }
        if self.raised_by.trim().is_empty() {
            missing.push(FormField::ReportedBy);
        }
        let Some(predicted) = self.date_predicted else {
            missing.push(FormField::PredictedDate);
            return Err(ValidationError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let severity = classify_severity(&self.severity);
        if !severity.is_known() {
            return Err(ValidationError::UnknownSeverity(self.severity.clone()));
        }

        Ok(NewMaintenanceLog {
            raised_by: self.raised_by.trim().to_string(),
            equipment_serial: self.equipment_serial.trim().to_string(),
            issue_description: self.issue_description.trim().to_string(),
            date_reported: format_wire_date(today),
            severity: severity.as_str().to_string(),
            date_predicted: Some(format_wire_date(predicted)),
        })
    }
}
