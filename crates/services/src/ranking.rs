//! # Ranking & Filtering
//!
//! Turns raw maintenance logs into the ordered views the dashboard shows.
//! Every function here is pure and uses a stable sort, so records with equal
//! keys keep the order the backend returned them in.
//!
//! The open-items schedule and the operator log list deliberately break ties
//! in opposite severity directions; each call site keeps its own rule.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domains::dates::{parse_instant, parse_or_epoch};
use domains::{
    classify_severity, severity_weight, AnalysisReport, Equipment, MaintenanceLog,
    MonitoringReading,
};
use serde::Serialize;

/// Serial → display-name lookup built from the equipment list.
#[derive(Debug, Clone, Default)]
pub struct EquipmentIndex {
    names: HashMap<String, String>,
}

impl EquipmentIndex {
    pub fn from_equipment(equipment: &[Equipment]) -> Self {
        let mut names = HashMap::with_capacity(equipment.len());
        for eq in equipment {
            // First row wins when the backend repeats a serial.
            names.entry(eq.serial.clone()).or_insert_with(|| eq.name.clone());
        }
        Self { names }
    }

    /// The equipment name, or the serial itself when the serial is unknown.
    pub fn display_name<'a>(&'a self, serial: &'a str) -> &'a str {
        self.names.get(serial).map(String::as_str).unwrap_or(serial)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Pending,
}

/// One row of the maintenance schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleItem {
    pub id: String,
    pub equipment: String,
    pub priority: String,
    pub scheduled_date: String,
    pub status: ScheduleStatus,
    pub predicted_issue: String,
    pub generated_by: Option<String>,
}

/// One row of the past-maintenance table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub id: String,
    pub equipment: String,
    pub equipment_serial: String,
    pub date_resolved: String,
    pub issue_description: String,
    pub raised_by: String,
    pub severity: String,
}

/// An operator-submitted open log, flagged when the latest validation pass
/// covered its equipment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntryView {
    pub id: String,
    pub equipment: String,
    pub timestamp: String,
    pub content: String,
    pub severity: String,
    pub analyzed: bool,
}

/// Descending comparison where an unparseable date sorts after every
/// parseable one.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    b.cmp(&a)
}

/// Open logs ranked by severity weight, then most recently reported.
/// `limit` truncates the fully sorted sequence.
pub fn rank_open_items(
    open_logs: &[MaintenanceLog],
    index: &EquipmentIndex,
    limit: Option<usize>,
) -> Vec<ScheduleItem> {
    let mut keyed: Vec<(u8, Option<DateTime<Utc>>, &MaintenanceLog)> = open_logs
        .iter()
        .map(|log| {
            (
                severity_weight(log.severity.as_deref()),
                parse_instant(&log.date_reported),
                log,
            )
        })
        .collect();

    keyed.sort_by(|(wa, da, _), (wb, db, _)| wb.cmp(wa).then_with(|| newest_first(*da, *db)));

    keyed
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(_, _, log)| ScheduleItem {
            id: log.id.to_string(),
            equipment: index.display_name(&log.equipment_serial).to_string(),
            priority: log.severity_text().to_string(),
            scheduled_date: log.scheduled_date().to_string(),
            status: ScheduleStatus::Pending,
            predicted_issue: log.issue_description.clone(),
            generated_by: log.raised_by.clone().filter(|by| !by.is_empty()),
        })
        .collect()
}

/// Resolved logs, most recently resolved first.
pub fn rank_closed_items(all_logs: &[MaintenanceLog], index: &EquipmentIndex) -> Vec<HistoryItem> {
    let mut closed: Vec<(DateTime<Utc>, &MaintenanceLog)> = all_logs
        .iter()
        .filter_map(|log| log.resolved_on().map(|d| (parse_or_epoch(Some(d)), log)))
        .collect();

    closed.sort_by(|(a, _), (b, _)| b.cmp(a));

    closed
        .into_iter()
        .map(|(_, log)| HistoryItem {
            id: log.id.to_string(),
            equipment: index.display_name(&log.equipment_serial).to_string(),
            equipment_serial: log.equipment_serial.clone(),
            date_resolved: log.resolved_on().unwrap_or_default().to_string(),
            issue_description: log.issue_description.clone(),
            raised_by: log.raised_by.clone().unwrap_or_default(),
            severity: log.severity_text().to_string(),
        })
        .collect()
}

/// Operator-submitted open logs, newest first, marked against the latest
/// analysis report.
///
/// Entries raised by the backend's own analysis are dropped. When the
/// reported dates do not decide the order, severity breaks the tie in
/// ascending weight, with a missing severity counting as `low`.
///
/// A date that is present but unparseable sorts after every parseable one,
/// whatever the severities, so the ordering stays total. An empty date
/// counts as the epoch.
pub fn dedupe_analyzed_logs(
    open_logs: &[MaintenanceLog],
    latest_report: &[AnalysisReport],
) -> Vec<LogEntryView> {
    let weight = |log: &MaintenanceLog| {
        let raw = log.severity.as_deref().filter(|s| !s.is_empty()).unwrap_or("low");
        severity_weight(Some(raw))
    };
    let reported = |log: &MaintenanceLog| {
        if log.date_reported.is_empty() {
            Some(DateTime::<Utc>::UNIX_EPOCH)
        } else {
            parse_instant(&log.date_reported)
        }
    };

    let mut keyed: Vec<(Option<DateTime<Utc>>, u8, &MaintenanceLog)> = open_logs
        .iter()
        .filter(|log| !log.is_ai_generated())
        .map(|log| (reported(log), weight(log), log))
        .collect();

    keyed.sort_by(|(da, wa, _), (db, wb, _)| newest_first(*da, *db).then_with(|| wa.cmp(wb)));

    keyed
        .into_iter()
        .map(|(_, _, log)| LogEntryView {
            id: log.id.to_string(),
            equipment: if log.equipment_serial.is_empty() {
                "Unknown".to_string()
            } else {
                log.equipment_serial.clone()
            },
            timestamp: log.date_reported.clone(),
            content: log.issue_description.clone(),
            severity: log
                .severity
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "low".to_string()),
            analyzed: latest_report
                .iter()
                .any(|r| r.equipment_details.serial == log.equipment_serial),
        })
        .collect()
}

/// Per-equipment maintenance history, most recently resolved first; open
/// entries sort as if resolved at the epoch.
pub fn sort_equipment_history(mut logs: Vec<MaintenanceLog>) -> Vec<MaintenanceLog> {
    logs.sort_by_cached_key(|log| std::cmp::Reverse(parse_or_epoch(log.resolved_on())));
    logs
}

/// Monitoring readings, newest first.
pub fn sort_readings(mut readings: Vec<MonitoringReading>) -> Vec<MonitoringReading> {
    readings.sort_by_cached_key(|r| std::cmp::Reverse(parse_instant(&r.timestamp)));
    readings
}

/// The "show all" toggle: a preview of the first `preview_size` items.
pub fn preview<T: Clone>(items: &[T], show_all: bool, preview_size: usize) -> Vec<T> {
    if show_all {
        items.to_vec()
    } else {
        items.iter().take(preview_size).cloned().collect()
    }
}

/// Whether a raw severity counts as an alert (critical or high).
pub fn is_alert_severity(raw: Option<&str>) -> bool {
    raw.map(|s| classify_severity(s).is_alert()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{EquipmentDetails, RecordId};

    fn log(id: i64, severity: &str, reported: &str) -> MaintenanceLog {
        MaintenanceLog {
            id: RecordId::Number(id),
            equipment_serial: format!("SN-{id}"),
            issue_description: format!("issue {id}"),
            date_reported: reported.to_string(),
            severity: Some(severity.to_string()),
            ..Default::default()
        }
    }

    fn ids(items: &[ScheduleItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn severity_beats_date() {
        let logs = vec![
            log(1, "low", "2025-01-30"),
            log(2, "critical", "2020-01-01"),
            log(3, "medium", "2025-01-29"),
            log(4, "HIGH", "2019-05-05"),
        ];
        let out = rank_open_items(&logs, &EquipmentIndex::default(), None);
        assert_eq!(ids(&out), vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn newer_first_within_a_severity() {
        let logs = vec![
            log(1, "high", "2024-01-01"),
            log(2, "high", "2024-03-01"),
            log(3, "high", "2024-02-01"),
        ];
        let out = rank_open_items(&logs, &EquipmentIndex::default(), None);
        assert_eq!(ids(&out), vec!["2", "3", "1"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let logs = vec![
            log(1, "medium", "2024-01-01"),
            log(2, "high", "2024-01-01"),
            log(3, "medium", "2024-01-01"),
            log(4, "medium", "2024-01-01"),
        ];
        let out = rank_open_items(&logs, &EquipmentIndex::default(), None);
        assert_eq!(ids(&out), vec!["2", "1", "3", "4"]);

        let reordered = vec![logs[3].clone(), logs[1].clone(), logs[0].clone(), logs[2].clone()];
        let out = rank_open_items(&reordered, &EquipmentIndex::default(), None);
        assert_eq!(ids(&out), vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn unknown_and_missing_severity_rank_last() {
        let mut missing = log(1, "", "2025-01-01");
        missing.severity = None;
        let logs = vec![missing, log(2, "bogus", "2025-01-02"), log(3, "low", "2000-01-01")];
        let out = rank_open_items(&logs, &EquipmentIndex::default(), None);
        assert_eq!(ids(&out), vec!["3", "2", "1"]);
    }

    #[test]
    fn unparseable_dates_keep_relative_order() {
        let logs = vec![
            log(1, "high", "soon"),
            log(2, "high", "later"),
            log(3, "high", "2024-01-01"),
        ];
        let out = rank_open_items(&logs, &EquipmentIndex::default(), None);
        assert_eq!(ids(&out), vec!["3", "1", "2"]);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let logs: Vec<_> = (1..=10)
            .map(|i| {
                let sev = if i > 7 { "critical" } else { "low" };
                log(i, sev, &format!("2024-01-{i:02}"))
            })
            .collect();

        let full = rank_open_items(&logs, &EquipmentIndex::default(), None);
        let top = rank_open_items(&logs, &EquipmentIndex::default(), Some(3));

        assert_eq!(top.len(), 3);
        assert_eq!(top, full[..3].to_vec());
        assert_eq!(ids(&top), vec!["10", "9", "8"]);
    }

    #[test]
    fn schedule_item_fields() {
        let equipment = vec![Equipment {
            serial: "SN-1".into(),
            name: "Screw Compressor".into(),
            ..Default::default()
        }];
        let index = EquipmentIndex::from_equipment(&equipment);

        let mut first = log(1, "high", "2025-05-20");
        first.date_predicted = Some("2025-06-01".into());
        first.raised_by = Some("AI System".into());
        let mut second = log(2, "low", "2025-05-19");
        second.raised_by = Some(String::new());

        let out = rank_open_items(&[first, second], &index, None);
        assert_eq!(out[0].equipment, "Screw Compressor");
        assert_eq!(out[0].scheduled_date, "2025-06-01");
        assert_eq!(out[0].status, ScheduleStatus::Pending);
        assert_eq!(out[0].generated_by.as_deref(), Some("AI System"));
        assert_eq!(out[1].equipment, "SN-2");
        assert_eq!(out[1].scheduled_date, "2025-05-19");
        assert_eq!(out[1].generated_by, None);
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(rank_open_items(&[], &EquipmentIndex::default(), Some(3)).is_empty());
        assert!(rank_closed_items(&[], &EquipmentIndex::default()).is_empty());
        assert!(dedupe_analyzed_logs(&[], &[]).is_empty());
    }

    #[test]
    fn closed_items_filter_and_order() {
        let mut a = log(1, "low", "2023-01-01");
        a.date_resolved = Some("2023-02-01".into());
        let b = log(2, "high", "2023-01-05");
        let mut c = log(3, "medium", "2023-01-03");
        c.date_resolved = Some("2023-06-28".into());
        let mut d = log(4, "medium", "2023-01-03");
        d.date_resolved = Some("".into());
        let mut e = log(5, "medium", "2023-01-03");
        e.date_resolved = Some("garbled".into());

        let out = rank_closed_items(&[a, b, c, d, e], &EquipmentIndex::default());
        let got: Vec<_> = out.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(got, vec!["3", "1", "5"]);
        assert_eq!(out[0].date_resolved, "2023-06-28");
        assert_eq!(out[0].equipment_serial, "SN-3");
        assert_eq!(out[0].equipment, "SN-3");
    }

    #[test]
    fn operator_logs_drop_ai_entries_and_flag_analyzed() {
        let mut ai = log(1, "critical", "2025-01-10");
        ai.raised_by = Some("AI System".into());
        let mut manual = log(2, "low", "2025-01-09");
        manual.raised_by = Some("Ops".into());
        let mut other = log(3, "low", "2025-01-11");
        other.raised_by = Some("Ops".into());

        let report = vec![AnalysisReport {
            equipment_details: EquipmentDetails {
                name: "x".into(),
                serial: "SN-2".into(),
            },
            ..Default::default()
        }];

        let out = dedupe_analyzed_logs(&[ai, manual, other], &report);
        let got: Vec<_> = out.iter().map(|e| (e.id.as_str(), e.analyzed)).collect();
        assert_eq!(got, vec![("3", false), ("2", true)]);
    }

    #[test]
    fn operator_logs_tie_break_on_ascending_severity() {
        let mut missing = log(4, "", "2025-01-01");
        missing.severity = None;
        let logs = vec![
            log(1, "critical", "2025-01-01"),
            log(2, "medium", "2025-01-01"),
            log(3, "weird", "2025-01-01"),
            missing,
        ];
        let out = dedupe_analyzed_logs(&logs, &[]);
        let got: Vec<_> = out.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(got, vec!["3", "4", "2", "1"]);
        assert_eq!(out[1].severity, "low");
    }

    #[test]
    fn operator_logs_put_unparseable_dates_after_parseable_ones() {
        let logs = vec![
            log(1, "low", "sometime last week"),
            log(2, "critical", "2025-01-01"),
            log(3, "high", ""),
        ];
        let out = dedupe_analyzed_logs(&logs, &[]);
        let got: Vec<_> = out.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(got, vec!["2", "3", "1"]);
    }

    #[test]
    fn equipment_history_open_entries_last() {
        let mut a = log(1, "low", "2023-01-01");
        a.date_resolved = Some("2023-02-01".into());
        let b = log(2, "low", "2023-01-01");
        let mut c = log(3, "low", "2023-01-01");
        c.date_resolved = Some("2024-02-01".into());

        let sorted = sort_equipment_history(vec![a, b, c]);
        let got: Vec<_> = sorted.iter().map(|l| l.id.to_string()).collect();
        assert_eq!(got, vec!["3", "1", "2"]);
    }

    #[test]
    fn readings_newest_first() {
        let r = |id: i64, ts: &str| MonitoringReading {
            id: RecordId::Number(id),
            timestamp: ts.into(),
            ..Default::default()
        };
        let sorted = sort_readings(vec![
            r(1, "2024-01-01T10:00:00"),
            r(2, "2024-01-01T12:00:00"),
            r(3, "2024-01-01T11:00:00"),
        ]);
        let got: Vec<_> = sorted.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(got, vec!["2", "3", "1"]);
    }

    #[test]
    fn preview_respects_toggle() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(preview(&items, false, 3), vec![1, 2, 3]);
        assert_eq!(preview(&items, true, 3), items);
    }
}
