//! Cell coercions. Every function here is total: a value that cannot be read
//! becomes the field's degenerate default instead of an error.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Days, NaiveDate};
use tracing::debug;

use super::Cell;

/// Text layouts accepted for date cells, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Last serial day spreadsheets can represent (9999-12-31)
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// Largest number of decimal places kept for an amount
const MAX_AMOUNT_SCALE: i64 = 18;

/// Coerce a cell to text. Blank cells become an empty string.
pub fn coerce_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) if n.is_finite() => n.to_string(),
        Cell::Number(_) | Cell::Empty => String::new(),
    }
}

/// Coerce a cell to a decimal amount. Blank or unreadable cells become zero.
pub fn coerce_amount(cell: &Cell) -> BigDecimal {
    let parsed = match cell {
        Cell::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        Cell::Text(s) => parse_amount(s),
        Cell::Empty => return BigDecimal::from(0),
    }
    .filter(within_scale);

    parsed.unwrap_or_else(|| {
        debug!(cell = ?cell, "Malformed amount cell, using 0");
        BigDecimal::from(0)
    })
}

/// Coerce a cell to a date. Blank or unreadable cells become `None`.
pub fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    let parsed = match cell {
        Cell::Number(n) => serial_to_date(*n),
        Cell::Text(s) if s.trim().is_empty() => return None,
        Cell::Text(s) => parse_date(s),
        Cell::Empty => return None,
    };

    if parsed.is_none() {
        debug!(cell = ?cell, "Malformed date cell, leaving it empty");
    }
    parsed
}

/// Parse amount text as exported by banks and ERPs: currency marks around the
/// number, thousands separators, and decimal commas are all accepted.
fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let trimmed = raw.trim_matches(|c: char| {
        c.is_whitespace() || c.is_alphabetic() || matches!(c, '€' | '$' | '£' | '¥')
    });
    if trimmed.is_empty() {
        return None;
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'')
        .collect();

    let normalized = match (compact.rfind('.'), compact.rfind(',')) {
        // Whichever separator comes last is the decimal one
        (Some(dot), Some(comma)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (None, Some(_)) if compact.matches(',').count() == 1 => compact.replace(',', "."),
        (None, Some(_)) => compact.replace(',', ""),
        (Some(_), None) if compact.matches('.').count() > 1 => compact.replace('.', ""),
        _ => compact,
    };

    // Plain decimal notation only, exponents are rejected
    let digits = normalized.strip_prefix(['-', '+']).unwrap_or(normalized.as_str());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    BigDecimal::from_str(&normalized).ok()
}

fn within_scale(amount: &BigDecimal) -> bool {
    amount.as_bigint_and_exponent().1.abs() <= MAX_AMOUNT_SCALE
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    // Timestamps keep only their date part
    let date_part = text.get(..10).filter(|_| text.len() > 10).unwrap_or(text);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Spreadsheet serial day numbers count from 1899-12-30
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL_DAY {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}
