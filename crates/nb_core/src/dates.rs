//! Date handling shared by the fetch window, article display and sorting.
//!
//! The search endpoint reports publication times either as RFC 3339 strings
//! or as compact `YYYYMMDDTHHMMSSZ` tokens; both normalize to UTC.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Article, Frequency};
use crate::{Error, Result};

const DISPLAY_FORMAT: &str = "%d-%m-%Y %H:%M";

fn parse_compact(raw: &str) -> Option<NaiveDateTime> {
    let bytes = raw.as_bytes();
    if bytes.len() != 16 || bytes[8] != b'T' || bytes[15] != b'Z' {
        return None;
    }
    let digits_ok = bytes[..8].iter().chain(&bytes[9..15]).all(u8::is_ascii_digit);
    if !digits_ok {
        return None;
    }
    let num = |from: usize, to: usize| raw[from..to].parse::<u32>().ok();
    let date = NaiveDate::from_ymd_opt(raw[0..4].parse().ok()?, num(4, 6)?, num(6, 8)?)?;
    date.and_hms_opt(num(9, 11)?, num(11, 13)?, num(13, 15)?)
}

/// Parses a publication timestamp in any of the accepted shapes.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(naive) = parse_compact(raw) {
        return Some(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `DD-MM-YYYY HH:MM` for display; unparseable input comes back unchanged.
pub fn format_display(raw: &str) -> String {
    match parse_published(raw) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Milliseconds since the epoch, or 0 when the input cannot be parsed.
pub fn sort_timestamp(raw: &str) -> i64 {
    parse_published(raw).map(|dt| dt.timestamp_millis()).unwrap_or(0)
}

/// Orders articles oldest first; undated articles sort as the epoch.
pub fn sort_oldest_first(articles: &mut [Article]) {
    articles.sort_by_key(|article| sort_timestamp(&article.published_at));
}

/// Inclusive calendar-day window used to scope an article search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::validation("End date must be after or equal to start date."));
        }
        Ok(Self { start, end })
    }

    /// Window ending `today` that covers one cadence period.
    pub fn for_frequency(frequency: Frequency, today: NaiveDate) -> Self {
        let start = match frequency {
            Frequency::Daily => today - Duration::days(1),
            Frequency::Weekly => today - Duration::days(7),
            // chrono clamps to the last day of a shorter month
            Frequency::Monthly => today.checked_sub_months(Months::new(1)).unwrap_or(today),
        };
        Self { start, end: today }
    }

    pub fn current(frequency: Frequency) -> Self {
        Self::for_frequency(frequency, Utc::now().date_naive())
    }
}
