//! Header-alias field extraction
//!
//! Each concern (description, date, amount, debit, credit) has an ordered
//! list of header spellings seen across bank export formats. Extraction
//! takes the first alias with a non-empty value, which is what lets one
//! pipeline ingest every bank's CSV without per-bank branching. Adding a new
//! bank format is a data change here, not a code change elsewhere.

use crate::rows::RawRow;

pub const DESCRIPTION_FIELDS: &[&str] = &[
    "description",
    "Description",
    "Transaction Description",
    "transaction description",
    "memo",
    "Memo",
    "narrative",
    "Narrative",
];

pub const DATE_FIELDS: &[&str] = &[
    "date",
    "Date",
    "transaction date",
    "Transaction Date",
    "posted date",
    "Posted Date",
];

pub const AMOUNT_FIELDS: &[&str] = &[
    "amount",
    "Amount",
    "transaction amount",
    "Transaction Amount",
    "value",
    "Value",
];

pub const DEBIT_FIELDS: &[&str] = &["debit", "Debit", "debit amount", "Debit Amount"];

pub const CREDIT_FIELDS: &[&str] = &["credit", "Credit", "credit amount", "Credit Amount"];

/// Value of the first alias present in the row with a non-empty trimmed
/// value.
pub fn first_non_empty<'a>(row: &'a RawRow, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|field| row.get(*field).map(|v| v.trim()).filter(|v| !v.is_empty()))
}

/// Trimmed description text, or an empty string when no description-like
/// column has a value (such rows are rejected downstream).
pub fn extract_description(row: &RawRow) -> String {
    first_non_empty(row, DESCRIPTION_FIELDS)
        .unwrap_or_default()
        .to_string()
}

/// Raw value of the first date-like column, if any.
pub fn extract_date_value(row: &RawRow) -> Option<&str> {
    first_non_empty(row, DATE_FIELDS)
}
