use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Stored `end_date` pattern.
pub const END_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f%:z",
    "%Y/%m/%d %H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%:z",
    "%Y%m%dT%H%M%S%.f%:z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", "UTC", "GMT", "Z", "z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a timestamp in any of the accepted layouts.
///
/// Inputs without an offset are taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_with_offset(s) {
        return Some(dt);
    }
    // `Z`, `UTC` and `GMT` designators become an explicit zero offset.
    for suffix in UTC_SUFFIXES {
        if let Some(stem) = s.strip_suffix(suffix) {
            if let Some(dt) = parse_with_offset(&format!("{}+00:00", stem.trim_end())) {
                return Some(dt);
            }
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Express `raw` in the canonical zone using [`END_DATE_FORMAT`].
///
/// Unparseable input is returned unchanged so a bad date never blocks ingestion.
pub fn normalize_end_date(raw: &str, zone: FixedOffset) -> String {
    match parse_timestamp(raw) {
        Some(instant) => instant.with_timezone(&zone).format(END_DATE_FORMAT).to_string(),
        None => {
            log::warn!("Invalid date format for end_date: {raw:?}, storing as received");
            raw.to_string()
        }
    }
}
