//! Date-format heuristic for aggregator CSV exports.
//!
//! Every aggregator writes dates differently (ISO dates, day-first or
//! month-first slashes, `yyyymm` periods, month names in English or
//! Spanish, spreadsheet serial numbers). [`parse_flexible_date`] accepts
//! all of them and falls back on the aggregator's [`DateOrder`] only when
//! a slash date is genuinely ambiguous.

use chrono::{Datelike, Duration, NaiveDate};

/// Lowest spreadsheet serial number accepted as a date (1954-10-03).
const MIN_SERIAL: i64 = 20_000;

/// Highest spreadsheet serial number accepted as a date (2119-01-11).
const MAX_SERIAL: i64 = 80_000;

/// Field order for ambiguous `a/b/yyyy` dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
}

/// Parse a date written in any of the formats aggregators use.
///
/// Returns `None` when the value is empty or unrecognizable. Periods
/// without a day (`2023-04`, `04/2023`, `Apr 2023`) resolve to the first
/// day of the month.
pub fn parse_flexible_date(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let trimmed = raw.trim().trim_matches('"').trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = strip_time(trimmed);

    parse_separated(value, order)
        .or_else(|| parse_compact(value))
        .or_else(|| parse_month_name(value))
        .or_else(|| parse_serial(value))
}

/// First day of the month containing `date`.
pub fn period_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Drop a trailing time component (`2023-01-15T10:00:00Z`,
/// `2023-01-15 10:00:00`).
fn strip_time(value: &str) -> &str {
    if let Some(idx) = value.find(['T', ' ']) {
        let (head, tail) = value.split_at(idx);
        if tail.contains(':') {
            return head;
        }
    }
    value
}

/// `yyyy-mm-dd`, `yyyy/mm/dd`, `dd/mm/yyyy`, `mm/dd/yy`, `yyyy-mm`, `mm/yyyy`.
fn parse_separated(value: &str, order: DateOrder) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split(['/', '-', '.']).collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty() || !is_digits(p)) {
        return None;
    }

    match parts.as_slice() {
        [y, m, d] if y.len() == 4 => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
        }
        [a, b, y] if y.len() == 4 || y.len() == 2 => {
            let a: u32 = a.parse().ok()?;
            let b: u32 = b.parse().ok()?;
            let year = expand_year(y)?;
            let (day, month) = if a > 12 {
                (a, b)
            } else if b > 12 {
                (b, a)
            } else {
                match order {
                    DateOrder::DayFirst => (a, b),
                    DateOrder::MonthFirst => (b, a),
                }
            };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        [y, m] if y.len() == 4 && m.len() <= 2 => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
        }
        [m, y] if y.len() == 4 && m.len() <= 2 => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
        }
        _ => None,
    }
}

/// `yyyymmdd` and `yyyymm`.
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if !is_digits(value) {
        return None;
    }
    let year: i32 = value.get(0..4)?.parse().ok()?;
    if !(1900..=2100).contains(&year) {
        return None;
    }
    match value.len() {
        8 => NaiveDate::from_ymd_opt(year, value[4..6].parse().ok()?, value[6..8].parse().ok()?),
        6 => NaiveDate::from_ymd_opt(year, value[4..6].parse().ok()?, 1),
        _ => None,
    }
}

/// `Jan 2023`, `January 2023`, `15 Jan 2023`, `Jan 15, 2023`, `ene-2023`.
fn parse_month_name(value: &str) -> Option<NaiveDate> {
    let tokens: Vec<String> = value
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | '.' | ','))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    let month_idx = tokens.iter().position(|t| month_from_name(t).is_some())?;
    let month = month_from_name(&tokens[month_idx])?;

    let numbers: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| *i != month_idx && is_digits(t))
        .map(|(_, t)| t.as_str())
        .collect();

    let (day, year) = match numbers.as_slice() {
        [y] => (1, expand_year(y)?),
        [a, b] if b.len() == 4 => (a.parse().ok()?, expand_year(b)?),
        [a, b] if a.len() == 4 => (b.parse().ok()?, expand_year(a)?),
        [a, b] => (a.parse().ok()?, expand_year(b)?),
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Spreadsheet serial numbers (days since 1899-12-30).
fn parse_serial(value: &str) -> Option<NaiveDate> {
    let serial = value.parse::<f64>().ok()?.floor() as i64;
    if !(MIN_SERIAL..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial))
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        2 => Some(2000 + year),
        4 => Some(year),
        _ => None,
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    let month = match token {
        "january" | "jan" | "enero" | "ene" => 1,
        "february" | "feb" | "febrero" => 2,
        "march" | "mar" | "marzo" => 3,
        "april" | "apr" | "abril" | "abr" => 4,
        "may" | "mayo" => 5,
        "june" | "jun" | "junio" => 6,
        "july" | "jul" | "julio" => 7,
        "august" | "aug" | "agosto" | "ago" => 8,
        "september" | "sep" | "sept" | "septiembre" | "setiembre" | "set" => 9,
        "october" | "oct" | "octubre" => 10,
        "november" | "nov" | "noviembre" => 11,
        "december" | "dec" | "diciembre" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
