//! Severity classification and the weights used to rank maintenance work.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual treatment of a badge. Mirrors the variants the dashboard styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Destructive,
    Default,
    Outline,
    Secondary,
    /// Amber fill used for medium priority.
    Amber,
    /// Yellow fill used for low priority.
    Yellow,
}

impl BadgeVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeVariant::Destructive => "destructive",
            BadgeVariant::Default => "default",
            BadgeVariant::Outline => "outline",
            BadgeVariant::Secondary => "secondary",
            BadgeVariant::Amber => "amber",
            BadgeVariant::Yellow => "yellow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub variant: BadgeVariant,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    /// Anything else, kept verbatim for display.
    Unknown(String),
}

/// Case-insensitive classification of a raw severity string.
pub fn classify_severity(raw: &str) -> Severity {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Severity::Low,
        "medium" => Severity::Medium,
        "high" => Severity::High,
        "critical" => Severity::Critical,
        _ => Severity::Unknown(raw.to_string()),
    }
}

impl Severity {
    /// Sort weight. Not displayed.
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
            Severity::Unknown(_) => 0,
        }
    }

    /// Critical and high both count as alerts on the dashboard.
    pub fn is_alert(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Severity::Unknown(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Unknown(raw) => raw,
        }
    }

    /// Priority badge for scheduled work.
    pub fn badge(&self) -> Badge {
        let (variant, label) = match self {
            Severity::Critical => (BadgeVariant::Destructive, "Critical Priority"),
            Severity::High => (BadgeVariant::Destructive, "High Priority"),
            Severity::Medium => (BadgeVariant::Amber, "Medium Priority"),
            Severity::Low => (BadgeVariant::Yellow, "Low Priority"),
            Severity::Unknown(raw) => (BadgeVariant::Secondary, raw.as_str()),
        };
        Badge {
            variant,
            label: label.to_string(),
        }
    }

    /// Colour for the raw severity text on resolved work. Anything that is
    /// not an alert or medium shares the low colour.
    pub fn tag_variant(&self) -> BadgeVariant {
        match self {
            Severity::Critical | Severity::High => BadgeVariant::Destructive,
            Severity::Medium => BadgeVariant::Amber,
            Severity::Low | Severity::Unknown(_) => BadgeVariant::Yellow,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight of an optional raw severity; missing counts as unknown.
pub fn severity_weight(raw: Option<&str>) -> u8 {
    raw.map(|s| classify_severity(s).weight()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_ignores_case() {
        assert_eq!(classify_severity("HIGH"), Severity::High);
        assert_eq!(classify_severity("high"), Severity::High);
        assert_eq!(classify_severity("Critical"), Severity::Critical);
    }

    #[test]
    fn unknown_keeps_raw_text() {
        let s = classify_severity("Urgent!!");
        assert_eq!(s, Severity::Unknown("Urgent!!".into()));
        assert_eq!(s.to_string(), "Urgent!!");
        assert_eq!(s.weight(), 0);
        assert_eq!(s.badge().label, "Urgent!!");
    }

    #[test]
    fn weights_are_strictly_ordered() {
        let order = ["critical", "high", "medium", "low", "???"];
        let weights: Vec<u8> = order.iter().map(|s| classify_severity(s).weight()).collect();
        assert_eq!(weights, vec![4, 3, 2, 1, 0]);
        assert_eq!(severity_weight(None), 0);
    }

    #[test]
    fn alert_badges_are_destructive() {
        assert_eq!(Severity::High.badge().variant, BadgeVariant::Destructive);
        assert_eq!(Severity::Critical.badge().label, "Critical Priority");
        assert!(Severity::High.is_alert());
        assert!(!Severity::Medium.is_alert());
    }

    #[test]
    fn medium_and_low_get_their_own_priority_badges() {
        assert_eq!(
            classify_severity("medium").badge(),
            Badge {
                variant: BadgeVariant::Amber,
                label: "Medium Priority".into()
            }
        );
        assert_eq!(
            classify_severity("Low").badge(),
            Badge {
                variant: BadgeVariant::Yellow,
                label: "Low Priority".into()
            }
        );
        assert_eq!(classify_severity("n/a").badge().variant, BadgeVariant::Secondary);
    }

    #[test]
    fn tag_colours_follow_severity() {
        assert_eq!(classify_severity("CRITICAL").tag_variant(), BadgeVariant::Destructive);
        assert_eq!(classify_severity("medium").tag_variant(), BadgeVariant::Amber);
        assert_eq!(classify_severity("low").tag_variant(), BadgeVariant::Yellow);
        assert_eq!(classify_severity("whatever").tag_variant(), BadgeVariant::Yellow);
    }
}
