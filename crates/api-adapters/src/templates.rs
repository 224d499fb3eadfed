//! # Templates
//!
//! Askama page templates. Views are flattened into display-ready rows here
//! so the templates only print strings.

use askama::Template;
use domains::dates::parse_instant;
use domains::{classify_severity, Badge};
use services::console::HistoryView;
use services::{DashboardQuery, DashboardView, Notice, SummaryCounts, Tone};

/// `Mar 4, 2025`, or the raw text when it is not a date.
fn display_date(raw: &str) -> String {
    match parse_instant(raw) {
        Some(instant) => instant.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

pub struct BadgeCell {
    pub class: &'static str,
    pub label: String,
}

impl From<Badge> for BadgeCell {
    fn from(badge: Badge) -> Self {
        Self {
            class: badge.variant.as_str(),
            label: badge.label,
        }
    }
}

pub struct NoticeCell {
    pub title: String,
    pub description: String,
    pub class: &'static str,
}

impl From<&Notice> for NoticeCell {
    fn from(notice: &Notice) -> Self {
        Self {
            title: notice.title.clone(),
            description: notice.description.clone(),
            class: match notice.tone {
                Tone::Info => "info",
                Tone::Destructive => "destructive",
            },
        }
    }
}

pub struct ScheduleRow {
    pub equipment: String,
    pub issue: String,
    pub date: String,
    pub priority: BadgeCell,
    pub ai_generated: bool,
}

pub struct EquipmentCell {
    pub serial: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub location: String,
    pub status: BadgeCell,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub summary: SummaryCounts,
    pub schedule: Vec<ScheduleRow>,
    pub schedule_total: usize,
    pub schedule_expanded: bool,
    pub equipment: Vec<EquipmentCell>,
    pub equipment_total: usize,
    pub equipment_expanded: bool,
    pub predicting: bool,
    pub notices: Vec<NoticeCell>,
}

impl DashboardTemplate {
    pub fn new(view: &DashboardView, query: DashboardQuery) -> Self {
        Self {
            summary: view.summary,
            schedule: view
                .schedule
                .iter()
                .map(|item| ScheduleRow {
                    equipment: item.equipment.clone(),
                    issue: item.predicted_issue.clone(),
                    date: display_date(&item.scheduled_date),
                    priority: classify_severity(&item.priority).badge().into(),
                    ai_generated: item.generated_by.as_deref() == Some(domains::AI_SYSTEM),
                })
                .collect(),
            schedule_total: view.schedule_total,
            schedule_expanded: query.show_all_schedule,
            equipment: view
                .equipment
                .iter()
                .map(|row| EquipmentCell {
                    serial: row.serial.clone(),
                    name: row.name.clone(),
                    manufacturer: row.manufacturer.clone(),
                    model: row.model.clone(),
                    location: row.location.clone(),
                    status: row.status.clone().into(),
                })
                .collect(),
            equipment_total: view.equipment_total,
            equipment_expanded: query.show_all_equipment,
            predicting: view.predicting,
            notices: view.notices.iter().map(NoticeCell::from).collect(),
        }
    }
}

/// Resolved work shows the backend's severity text as-is, coloured by class.
fn severity_tag(raw: &str) -> BadgeCell {
    BadgeCell {
        class: classify_severity(raw).tag_variant().as_str(),
        label: raw.to_string(),
    }
}

pub struct HistoryRow {
    pub equipment: String,
    pub serial: String,
    pub resolved: String,
    pub issue: String,
    pub raised_by: String,
    pub severity: BadgeCell,
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub rows: Vec<HistoryRow>,
    pub notices: Vec<NoticeCell>,
}

impl HistoryTemplate {
    pub fn new(view: &HistoryView) -> Self {
        Self {
            rows: view
                .items
                .iter()
                .map(|item| HistoryRow {
                    equipment: item.equipment.clone(),
                    serial: item.equipment_serial.clone(),
                    resolved: display_date(&item.date_resolved),
                    issue: item.issue_description.clone(),
                    raised_by: item.raised_by.clone(),
                    severity: severity_tag(&item.severity),
                })
                .collect(),
            notices: view.notices.iter().map(NoticeCell::from).collect(),
        }
    }
}
