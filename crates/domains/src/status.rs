//! Status classifiers for equipment rows and sensor readings.

use serde::{Deserialize, Serialize};

use crate::severity::{Badge, BadgeVariant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipmentStatus {
    Operational,
    Warning,
    Critical,
    Other(String),
}

impl EquipmentStatus {
    pub fn classify(raw: &str) -> Self {
        match raw {
            "operational" => EquipmentStatus::Operational,
            "warning" => EquipmentStatus::Warning,
            "critical" => EquipmentStatus::Critical,
            other => EquipmentStatus::Other(other.to_string()),
        }
    }

    pub fn badge(&self) -> Badge {
        let (variant, label) = match self {
            EquipmentStatus::Critical => (BadgeVariant::Destructive, "Critical"),
            EquipmentStatus::Warning => (BadgeVariant::Default, "Warning"),
            EquipmentStatus::Operational => (BadgeVariant::Outline, "Operational"),
            EquipmentStatus::Other(raw) => (BadgeVariant::Secondary, raw.as_str()),
        };
        Badge {
            variant,
            label: label.to_string(),
        }
    }
}

/// Colour family of a monitoring reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingTone {
    Success,
    Warning,
    Error,
}

impl ReadingTone {
    pub fn classify(raw: &str) -> Self {
        match raw {
            "normal" => ReadingTone::Success,
            "warning" => ReadingTone::Warning,
            _ => ReadingTone::Error,
        }
    }
}
