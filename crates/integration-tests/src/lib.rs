//! Shared fixtures for the cross-crate suites under `tests/`.

use std::sync::Arc;

use chrono::NaiveDate;
use domains::{Equipment, MaintenanceBackend, MaintenanceLog, RecordId};
use services::{MaintenanceService, ServiceSettings};

/// The date every fixture service believes it is.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
}

pub fn service(backend: impl MaintenanceBackend + 'static) -> MaintenanceService {
    MaintenanceService::new(Arc::new(backend), ServiceSettings::default()).with_clock(today)
}

pub fn equipment(serial: &str, name: &str, status: &str) -> Equipment {
    Equipment {
        id: RecordId::Text(serial.to_string()),
        name: name.to_string(),
        manufacturer: "Acme".to_string(),
        model: "X1".to_string(),
        serial: serial.to_string(),
        location: "Plant 1".to_string(),
        status: status.to_string(),
        ..Default::default()
    }
}

pub fn open_log(id: i64, serial: &str, severity: &str, reported: &str) -> MaintenanceLog {
    MaintenanceLog {
        id: RecordId::Number(id),
        raised_by: Some("Operator".to_string()),
        equipment_serial: serial.to_string(),
        issue_description: format!("issue {id}"),
        date_reported: reported.to_string(),
        severity: Some(severity.to_string()),
        status: Some("open".to_string()),
        ..Default::default()
    }
}

pub fn closed_log(id: i64, serial: &str, resolved: &str) -> MaintenanceLog {
    MaintenanceLog {
        date_resolved: Some(resolved.to_string()),
        status: Some("closed".to_string()),
        ..open_log(id, serial, "medium", "2025-01-01")
    }
}
