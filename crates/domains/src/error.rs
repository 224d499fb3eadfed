//! # MonitorError
//!
//! Failures the console can run into while talking to the backend. Every one
//! of them is recovered at the call site and turned into a notice; nothing is
//! fatal.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationError;

/// The backend operations the console performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ListEquipments,
    ListOpenLogs,
    ListAllLogs,
    EquipmentLogs,
    MonitoringReadings,
    AddLog,
    RunAnalysis,
    RunValidation,
    Chat,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListEquipments => "list_equipments",
            Operation::ListOpenLogs => "list_open_logs",
            Operation::ListAllLogs => "list_all_logs",
            Operation::EquipmentLogs => "equipment_logs",
            Operation::MonitoringReadings => "monitoring_readings",
            Operation::AddLog => "add_log",
            Operation::RunAnalysis => "run_analysis",
            Operation::RunValidation => "run_validation",
            Operation::Chat => "chat",
        }
    }

    /// The fixed message shown when this operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::ListEquipments => "Failed to fetch equipments",
            Operation::ListOpenLogs => "Failed to fetch open maintenance logs",
            Operation::ListAllLogs => "Failed to fetch maintenance list",
            Operation::EquipmentLogs => "Failed to load maintenance logs. Please try again.",
            Operation::MonitoringReadings => "Failed to load monitoring logs. Please try again.",
            Operation::AddLog => "Failed to add maintenance log",
            Operation::RunAnalysis => "Failed to run AI analysis. Please try again.",
            Operation::RunValidation => "Unable to retrieve AI analysis results. Please try again.",
            Operation::Chat => "Failed to communicate with AI Assistant",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// Transport error or non-2xx status. `detail` carries the backend's own
    /// explanation when it sent one.
    #[error("{operation} failed{}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    NetworkFailure {
        operation: Operation,
        status: Option<u16>,
        detail: Option<String>,
    },

    /// A typed response did not have the expected shape.
    #[error("{operation} returned an unexpected response: {reason}")]
    MalformedResponse { operation: Operation, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl MonitorError {
    pub fn network(operation: Operation, status: Option<u16>) -> Self {
        MonitorError::NetworkFailure {
            operation,
            status,
            detail: None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            MonitorError::NetworkFailure { operation, .. }
            | MonitorError::MalformedResponse { operation, .. } => Some(*operation),
            MonitorError::Validation(_) => Some(Operation::AddLog),
        }
    }

    /// Text shown to the operator. Only add-log failures echo the backend's
    /// `detail`; everything else uses the fixed message for the operation.
    pub fn user_message(&self) -> String {
        match self {
            MonitorError::NetworkFailure {
                operation: Operation::AddLog,
                detail: Some(detail),
                ..
            } => detail.clone(),
            MonitorError::NetworkFailure { operation, .. }
            | MonitorError::MalformedResponse { operation, .. } => {
                operation.failure_message().to_string()
            }
            MonitorError::Validation(err) => err.to_string(),
        }
    }
}

/// A specialized Result type for console operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
