//! Reporting windows.
//!
//! Every window is `[start, end)`: the start day is included, the end day is
//! not. User-facing bounds are inclusive calendar days, so the inclusive end
//! is moved one day forward before it reaches a range query.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{EngineError, ResultEngine};

pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 9999;

/// A half-open range of calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Builds `[start, end)`. `start == end` is a valid, empty window.
    pub fn new(start: NaiveDate, end_exclusive: NaiveDate) -> ResultEngine<Self> {
        if start > end_exclusive {
            return Err(EngineError::InvalidRange(format!(
                "start {start} is after end {end_exclusive}"
            )));
        }
        Ok(Self {
            start,
            end: end_exclusive,
        })
    }

    /// Builds the window covering `first..=last`.
    pub fn inclusive(first: NaiveDate, last: NaiveDate) -> ResultEngine<Self> {
        if first > last {
            return Err(EngineError::InvalidRange(format!(
                "'from' ({first}) must be on/before 'to' ({last})"
            )));
        }
        let end = last
            .succ_opt()
            .ok_or_else(|| EngineError::OutOfRange(format!("date {last} has no successor")))?;
        Self::new(first, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end_exclusive(&self) -> NaiveDate {
        self.end
    }

    /// Last day inside the window, `None` when the window is empty.
    pub fn last_day(&self) -> Option<NaiveDate> {
        if self.is_empty() {
            None
        } else {
            self.end.pred_opt()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// `true` when `token` is dash-separated ASCII digit groups of exactly
/// these widths, e.g. `[4, 2]` for `2024-03`.
fn has_digit_groups(token: &str, widths: &[usize]) -> bool {
    let groups: Vec<&str> = token.split('-').collect();
    groups.len() == widths.len()
        && groups
            .iter()
            .zip(widths)
            .all(|(group, width)| {
                group.len() == *width && group.bytes().all(|b| b.is_ascii_digit())
            })
}

/// Parses a zero-padded `YYYY-MM-DD` token.
pub fn parse_date(label: &str, token: &str) -> ResultEngine<NaiveDate> {
    let malformed =
        || EngineError::MalformedInput(format!("invalid '{label}' (expected YYYY-MM-DD)"));

    let token = token.trim();
    if !has_digit_groups(token, &[4, 2, 2]) {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| malformed())
}

/// Parses a `YYYY-MM` token into the first day of that month.
pub fn parse_month(token: &str) -> ResultEngine<NaiveDate> {
    let malformed = || EngineError::MalformedInput("invalid 'month' (expected YYYY-MM)".to_string());

    let token = token.trim();
    if !has_digit_groups(token, &[4, 2]) {
        return Err(malformed());
    }
    let (year, month) = token.split_once('-').ok_or_else(malformed)?;
    let year: i32 = year.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(malformed)
}

/// Parses a year token and checks it lies in `[MIN_YEAR, MAX_YEAR]`.
pub fn parse_year(token: &str) -> ResultEngine<i32> {
    let year: i32 = token
        .trim()
        .parse()
        .map_err(|_| EngineError::MalformedInput("invalid 'year' (expected YYYY)".to_string()))?;
    ensure_year(year)?;
    Ok(year)
}

fn ensure_year(year: i32) -> ResultEngine<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(EngineError::OutOfRange(format!(
            "year {year} outside [{MIN_YEAR}, {MAX_YEAR}]"
        )))
    }
}

fn first_of_year(year: i32) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| EngineError::OutOfRange(format!("year {year} not representable")))
}

/// Resolves the window of summary-style endpoints.
///
/// | from | to  | window                          |
/// |------|-----|---------------------------------|
/// | -    | -   | Jan 1 of `today`'s year ..= today |
/// | set  | -   | from ..= today                  |
/// | -    | set | Jan 1 of `to`'s year ..= to     |
/// | set  | set | from ..= to                     |
pub fn resolve_period(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> ResultEngine<Period> {
    let (first, last) = match (from, to) {
        (None, None) => (first_of_year(today.year())?, today),
        (Some(from), None) => (from, today),
        (None, Some(to)) => (first_of_year(to.year())?, to),
        (Some(from), Some(to)) => (from, to),
    };
    Period::inclusive(first, last)
}

/// `[first of month, first of next month)`; defaults to `today`'s month.
pub fn month_period(month: Option<NaiveDate>, today: NaiveDate) -> ResultEngine<Period> {
    let month = month.unwrap_or(today);
    let start = month
        .with_day(1)
        .ok_or_else(|| EngineError::OutOfRange(format!("invalid month {month}")))?;
    let (year, next) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, next, 1)
        .ok_or_else(|| EngineError::OutOfRange(format!("month after {start} not representable")))?;
    Period::new(start, end)
}

/// `[Jan 1, Jan 1 of next year)`; defaults to `today`'s year.
pub fn year_period(year: Option<i32>, today: NaiveDate) -> ResultEngine<Period> {
    calendar_year(year.unwrap_or(today.year()))
}

/// `[Jan 1 of year, Jan 1 of year + 1)`.
pub fn calendar_year(year: i32) -> ResultEngine<Period> {
    ensure_year(year)?;
    Period::new(first_of_year(year)?, first_of_year(year + 1)?)
}
