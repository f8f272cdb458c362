//! Tolerant timestamp parsing for robot controller logs.
//!
//! Controllers write time in several ad-hoc shapes, sometimes within the same
//! file. Each cell is tried against three tiers and the first hit wins:
//!
//! 1. `YYYY-MM-DD HH-MM-SS-mmm`: dash-separated time with 3-digit milliseconds.
//! 2. A fixed list of explicit layouts (see [`EXPLICIT_LAYOUTS`]).
//! 3. A best-effort generic pass over common ISO / RFC / date-only shapes.
//!
//! A cell that fails every tier is `None`; this is never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::Cell;

static MILLIS_DASH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})\s+(\d{2})-(\d{2})-(\d{2})-(\d{3})$")
        .expect("static timestamp pattern")
});

/// Explicit layouts, tried in order. The second field is the separator in
/// front of an optional fractional-seconds group (1–6 digits, read as a
/// left-aligned fraction, i.e. `-5` is half a second).
pub const EXPLICIT_LAYOUTS: &[(&str, Option<char>)] = &[
    ("%Y-%m-%d %H:%M:%S", Some('.')),
    ("%Y-%m-%d %H:%M:%S", None),
    ("%Y-%m-%d %H:%M:%S", Some('-')),
    ("%Y-%m-%d %H-%M-%S", Some('-')),
    ("%Y/%m/%d %H:%M:%S", Some('.')),
    ("%Y/%m/%d %H:%M:%S", None),
];

const GENERIC_DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%Y%m%dT%H%M%S",
];

const GENERIC_DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

/// Parse one raw timestamp string.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_millis_dash(s)
        .or_else(|| parse_explicit(s))
        .or_else(|| parse_generic(s))
}

/// Parse a cell of the time column. Cells that already hold a timestamp pass
/// through; missing cells stay missing.
pub fn parse_cell(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Timestamp(t) => Some(*t),
        c if c.is_null() => None,
        c => parse_timestamp(&c.raw_text()),
    }
}

fn parse_millis_dash(s: &str) -> Option<NaiveDateTime> {
    let caps = MILLIS_DASH_PATTERN.captures(s)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?;
    let millis = num(7)?;
    date.and_hms_micro_opt(num(4)?, num(5)?, num(6)?, millis * 1000)
}

fn parse_explicit(s: &str) -> Option<NaiveDateTime> {
    EXPLICIT_LAYOUTS.iter().find_map(|&(layout, fraction)| match fraction {
        None => NaiveDateTime::parse_from_str(s, layout).ok(),
        Some(sep) => parse_with_fraction(s, layout, sep),
    })
}

/// `<layout><sep><digits>` where the digits are a fraction of a second.
fn parse_with_fraction(s: &str, layout: &str, sep: char) -> Option<NaiveDateTime> {
    let (head, frac) = s.rsplit_once(sep)?;
    if frac.is_empty() || frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let base = NaiveDateTime::parse_from_str(head, layout).ok()?;
    let micros: u32 = format!("{frac:0<6}").parse().ok()?;
    base.with_nanosecond(micros * 1000)
}

fn parse_generic(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = GENERIC_DATETIME_LAYOUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    GENERIC_DATE_LAYOUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
