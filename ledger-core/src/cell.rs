//! Cell coercion and fixed-arity row decoding
//!
//! Rows come back from the store as variable-length text sequences: older
//! rows lack trailing columns and amounts carry display formatting such as
//! `₩12,345`. Every row is first widened to a fixed arity with explicit
//! `None` for absent cells, then each field is read through a coercion that
//! never fails.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Parse a display-formatted numeric cell.
///
/// Every character other than digits, `.` and `-` is dropped, then the
/// longest leading number is taken (`"12-34"` reads as 12, `"1.2.3"` as 1.2).
/// Anything without a leading number reads as zero.
pub fn parse_number(cell: &str) -> Decimal {
    let stripped: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut chars = stripped.chars().peekable();
    let negative = chars.peek() == Some(&'-');
    if negative {
        chars.next();
    }

    let mut whole = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        whole.push(c);
        chars.next();
    }

    let mut fraction = String::new();
    if chars.peek() == Some(&'.') {
        chars.next();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            fraction.push(c);
            chars.next();
        }
    }

    if whole.is_empty() && fraction.is_empty() {
        return Decimal::ZERO;
    }

    let mut normalized = String::with_capacity(whole.len() + fraction.len() + 3);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if whole.is_empty() { "0" } else { &whole });
    if !fraction.is_empty() {
        normalized.push('.');
        normalized.push_str(&fraction);
    }

    match Decimal::from_str(&normalized) {
        Ok(value) if value.is_zero() => Decimal::ZERO,
        Ok(value) => value,
        Err(e) => {
            debug!("numeric cell {:?} out of range ({}), reading as 0", cell, e);
            Decimal::ZERO
        }
    }
}

/// Parse the integer part of a `C-<n>` customer number.
///
/// Leading whitespace after the prefix is skipped and trailing garbage is
/// ignored (`"C-1005a"` reads as 1005). Returns `None` for cells without the
/// prefix or without digits.
pub fn parse_customer_number(cell: &str) -> Option<i64> {
    let rest = cell.strip_prefix("C-")?.trim_start();
    let (sign, digits) = match rest.strip_prefix('-') {
        Some(tail) => (-1, tail),
        None => (1, rest.strip_prefix('+').unwrap_or(rest)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Parse a sale date cell.
///
/// Accepts ISO dates, RFC 3339 timestamps and the dotted or slashed forms a
/// spreadsheet renders dates in (`2024. 1. 5`, `2024/01/05`).
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Some(ts.date_naive());
    }
    let compact: String = cell.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.trim_end_matches('.');
    ["%Y.%m.%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(compact, fmt).ok())
}

/// A row widened to exactly `N` cells
///
/// Empty cells are treated the same as missing ones.
#[derive(Debug, Clone)]
pub struct FixedRow<'a, const N: usize> {
    cells: [Option<&'a str>; N],
}

impl<'a, const N: usize> FixedRow<'a, N> {
    /// Widen or truncate a raw row to `N` cells
    pub fn from_cells(row: &'a [String]) -> Self {
        let mut cells = [None; N];
        for (slot, cell) in cells.iter_mut().zip(row.iter()) {
            if !cell.is_empty() {
                *slot = Some(cell.as_str());
            }
        }
        Self { cells }
    }

    /// Raw cell, `None` when absent or empty
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.cells.get(index).copied().flatten()
    }

    /// Text cell, empty when absent
    pub fn text(&self, index: usize) -> String {
        self.get(index).unwrap_or_default().to_string()
    }

    /// Text cell with a default for absent values
    pub fn text_or(&self, index: usize, default: &str) -> String {
        self.get(index).unwrap_or(default).to_string()
    }

    /// Optional text cell
    pub fn optional(&self, index: usize) -> Option<String> {
        self.get(index).map(str::to_string)
    }

    /// Numeric cell, zero when absent or unparseable
    pub fn number(&self, index: usize) -> Decimal {
        self.get(index).map(parse_number).unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_currency_text() {
        assert_eq!(parse_number("₩12,345"), Decimal::from(12345));
        assert_eq!(parse_number("12,345원"), Decimal::from(12345));
        assert_eq!(parse_number(" 1,234.50 "), Decimal::new(123450, 2));
        assert_eq!(parse_number("-₩5,000"), Decimal::from(-5000));
    }

    #[test]
    fn test_parse_unparseable_is_zero() {
        assert_eq!(parse_number(""), Decimal::ZERO);
        assert_eq!(parse_number("없음"), Decimal::ZERO);
        assert_eq!(parse_number("-"), Decimal::ZERO);
        assert_eq!(parse_number("."), Decimal::ZERO);
        assert_eq!(parse_number("-0"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_takes_leading_number() {
        assert_eq!(parse_number("1.2.3"), Decimal::new(12, 1));
        assert_eq!(parse_number("12-34"), Decimal::from(12));
        assert_eq!(parse_number(".5"), Decimal::new(5, 1));
        assert_eq!(parse_number("7."), Decimal::from(7));
    }

    #[test]
    fn test_parse_overflow_is_zero() {
        assert_eq!(parse_number(&"9".repeat(40)), Decimal::ZERO);
    }

    #[test]
    fn test_customer_number() {
        assert_eq!(parse_customer_number("C-1001"), Some(1001));
        assert_eq!(parse_customer_number("C-1005a"), Some(1005));
        assert_eq!(parse_customer_number("C- 42"), Some(42));
        assert_eq!(parse_customer_number("C-abc"), None);
        assert_eq!(parse_customer_number("c-1001"), None);
        assert_eq!(parse_customer_number("1001"), None);
        assert_eq!(parse_customer_number("C-"), None);
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(parse_date("2024-01-05"), expected);
        assert_eq!(parse_date("2024. 1. 5"), expected);
        assert_eq!(parse_date("2024. 1. 5."), expected);
        assert_eq!(parse_date("2024/01/05"), expected);
        assert_eq!(parse_date("2024-01-05T10:00:00+09:00"), expected);
        assert_eq!(parse_date("어제"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_fixed_row_fill() {
        let raw = vec!["a".to_string(), "".to_string(), "3".to_string()];
        let row: FixedRow<'_, 5> = FixedRow::from_cells(&raw);
        assert_eq!(row.text(0), "a");
        assert_eq!(row.optional(1), None);
        assert_eq!(row.number(2), Decimal::from(3));
        assert_eq!(row.get(4), None);
        assert_eq!(row.text_or(4, "x"), "x");
        assert_eq!(row.number(9), Decimal::ZERO);
    }
}
