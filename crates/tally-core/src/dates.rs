//! Date normalization
//!
//! Statement dates must always resolve: a transaction with a garbled date is
//! still worth keeping, so unparseable input falls back to today rather than
//! failing the row.

use chrono::{DateTime, NaiveDate, Utc};

/// Parse a raw statement date, resolving to today (UTC) when absent or
/// unparseable. Never fails.
///
/// `DD/MM/YYYY` is tried first: the UK bank exports this pipeline grew up on
/// are day-first, and `01/02/2025` must read as 1 February.
pub fn parse_date(raw: Option<&str>) -> NaiveDate {
    let value = match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value,
        None => return Utc::now().date_naive(),
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, "%d/%m/%Y") {
        return date;
    }

    let formats = [
        "%Y-%m-%d", // 2025-01-15
        "%Y/%m/%d", // 2025/01/15
        "%d/%m/%y", // 15/01/25
        "%d-%m-%Y", // 15-01-2025
        "%b %d, %Y", // Jan 15, 2025
        "%d %b %Y", // 15 Jan 2025
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date;
        }
    }

    // Some exports carry full timestamps.
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.date_naive();
    }

    Utc::now().date_naive()
}
