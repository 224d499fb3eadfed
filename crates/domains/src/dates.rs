//! Date handling at the wire boundary.
//!
//! Outgoing dates are always `yyyy-MM-dd`. Incoming dates arrive in whatever
//! ISO-ish form the backend's `str(date)` produced, so parsing is lenient.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Formats a calendar date the way the backend expects it.
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

/// Parses an incoming date or timestamp into an instant. Returns `None` when
/// the text is not a recognisable ISO form.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, WIRE_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Like [`parse_instant`], but anything unparseable counts as the Unix epoch.
pub fn parse_or_epoch(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(parse_instant).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
