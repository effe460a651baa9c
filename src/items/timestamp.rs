use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::feed::RawEntry;

/// Sort key for entries without any usable date: 1970-01-01T00:00:00Z.
///
/// Undated entries therefore sink to the end of a newest-first listing.
pub const EPOCH: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Derives the UTC instant used to order an entry.
///
/// Sources are tried in order, first success wins:
///
/// 1. structured `published_parsed`, then `updated_parsed` (taken as UTC)
/// 2. textual `published`, then `updated`, via [`parse_date_text`]
/// 3. [`EPOCH`]
///
/// Never fails. Malformed dates are common in the wild and simply fall
/// through to the next source.
pub fn extract_timestamp(entry: &RawEntry) -> DateTime<Utc> {
    let structured = [entry.published_parsed, entry.updated_parsed]
        .into_iter()
        .flatten()
        .next()
        .map(|naive| Utc.from_utc_datetime(&naive));
    if let Some(dt) = structured {
        return dt;
    }

    [entry.published.as_deref(), entry.updated.as_deref()]
        .into_iter()
        .flatten()
        .find_map(parse_date_text)
        .unwrap_or(EPOCH)
}

/// Parses a feed date string into UTC.
///
/// RFC 2822 (`Fri, 01 Mar 2024 10:00:00 +0100`) is the RSS format and is
/// tried first. Atom-style RFC 3339 and bare `YYYY-MM-DD` dates are accepted
/// as well since plenty of RSS feeds emit them anyway.
pub fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
