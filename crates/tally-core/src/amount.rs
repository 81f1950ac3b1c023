//! Amount normalization
//!
//! Statement amounts arrive in every shape banks can invent: currency
//! symbols, parenthesized negatives, trailing minus signs, DR/CR markers,
//! and both `1,234.56` and `1.234,56` separator conventions, sometimes in
//! combination. `parse_amount` reduces all of that to a signed float, and
//! `derive_amount` layers the single-amount-column vs. split
//! debit/credit-column choice on top.

use crate::fields::{first_non_empty, AMOUNT_FIELDS, CREDIT_FIELDS, DEBIT_FIELDS};
use crate::rows::RawRow;

/// Parse a raw amount string into a signed value.
///
/// Returns `None` for empty, non-numeric, or non-finite input; callers treat
/// that as "drop this row", never as zero.
///
/// Sign resolution: parentheses and leading/trailing minus markers multiply
/// together; a DR/Debit or CR/Credit word, when present, is the sign
/// authority and overrides the markers (DR forces negative, CR forces
/// positive even alongside a minus).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut value = raw.trim().to_string();
    if value.is_empty() {
        return None;
    }

    let mut sign = 1.0_f64;
    let mut word_sign: Option<f64> = None;

    if value.starts_with('(') && value.ends_with(')') {
        sign = -sign;
        value = value[1..value.len() - 1].to_string();
    }

    if let Some(rest) = strip_leading_word(&value, &["debit", "dr"]) {
        word_sign = Some(-1.0);
        value = rest;
    } else if let Some(rest) = strip_leading_word(&value, &["credit", "cr"]) {
        word_sign = Some(1.0);
        value = rest;
    }

    if let Some(rest) = strip_trailing_word(&value, &["debit", "dr"]) {
        word_sign = Some(-1.0);
        value = rest;
    } else if let Some(rest) = strip_trailing_word(&value, &["credit", "cr"]) {
        word_sign = Some(1.0);
        value = rest;
    }

    value.retain(|c| !matches!(c, '£' | '$' | '€') && !c.is_whitespace());

    if value.starts_with('-') {
        sign = -sign;
        value.remove(0);
    }
    if value.ends_with('-') {
        sign = -sign;
        value.pop();
    }

    value = normalize_separators(&value);
    value.retain(|c| c.is_ascii_digit() || c == '.');

    if value.is_empty() {
        return None;
    }

    let parsed: f64 = value.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }

    Some(parsed * word_sign.unwrap_or(sign))
}

/// Resolve the signed amount for a row.
///
/// Preference order: an explicit debit column (negated if positive), then an
/// explicit credit column (negated if negative), then a generic amount
/// column taken as-is. A column that is present but unparseable falls
/// through to the next choice.
pub fn derive_amount(row: &RawRow) -> Option<f64> {
    if let Some(raw) = first_non_empty(row, DEBIT_FIELDS) {
        if let Some(parsed) = parse_amount(raw) {
            return Some(if parsed > 0.0 { -parsed } else { parsed });
        }
    }

    if let Some(raw) = first_non_empty(row, CREDIT_FIELDS) {
        if let Some(parsed) = parse_amount(raw) {
            return Some(if parsed < 0.0 { -parsed } else { parsed });
        }
    }

    first_non_empty(row, AMOUNT_FIELDS).and_then(parse_amount)
}

/// Strip one of `words` from the start of `value`, case-insensitively,
/// requiring a word boundary so "DRIVE-THRU" is not read as a debit marker.
fn strip_leading_word(value: &str, words: &[&str]) -> Option<String> {
    let lower = value.to_lowercase();
    for word in words {
        if lower.starts_with(word) {
            let rest = &value[word.len()..];
            let boundary = rest
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric() && c != '_');
            if boundary {
                return Some(rest.to_string());
            }
        }
    }
    None
}

/// Strip one of `words` from the end of `value`, case-insensitively.
fn strip_trailing_word(value: &str, words: &[&str]) -> Option<String> {
    let lower = value.to_lowercase();
    for word in words {
        if lower.ends_with(word) {
            return Some(value[..value.len() - word.len()].to_string());
        }
    }
    None
}

/// Disambiguate `,` and `.` so the result uses `.` as the decimal point.
///
/// When both appear, whichever occurs later in the string is the decimal
/// point and the other is grouping. A lone comma with exactly three digits
/// after it is grouping; any other lone-comma pattern is a decimal comma.
/// Multiple commas with no dot are grouping.
fn normalize_separators(value: &str) -> String {
    let comma_count = value.matches(',').count();
    let dot_count = value.matches('.').count();

    if comma_count > 0 && dot_count > 0 {
        if value.rfind(',') > value.rfind('.') {
            value.replace('.', "").replace(',', ".")
        } else {
            value.replace(',', "")
        }
    } else if comma_count == 1 {
        let fractional = value.split(',').nth(1).unwrap_or("");
        if fractional.len() == 3 {
            value.replace(',', "")
        } else {
            value.replace(',', ".")
        }
    } else if comma_count > 1 {
        value.replace(',', "")
    } else {
        value.to_string()
    }
}
