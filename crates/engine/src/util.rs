//! Internal helpers for label normalization and month arithmetic.
//!
//! These utilities are **not** part of the public API. They centralize the
//! comparison rules so the resolver, the stores and the writers agree on when
//! two category labels are "the same".

use chrono::{Datelike, NaiveDate};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim and collapse inner whitespace. Returns `None` for blank input.
pub(crate) fn normalize_category_display(input: &str) -> Option<String> {
    let mut out = String::new();
    for token in input.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Case-insensitive comparison key for a category label.
///
/// Composes the label to NFC before lowercasing so that the same word typed
/// with precomposed or combining accents compares equal.
pub(crate) fn normalize_category_key(input: &str) -> Option<String> {
    let display = normalize_category_display(input)?;
    Some(display.nfc().flat_map(char::to_lowercase).collect())
}

/// Validates a user-supplied category or alias label.
///
/// Returns `(display, key)`.
pub(crate) fn required_label(value: &str, label: &str) -> ResultEngine<(String, String)> {
    let display = normalize_category_display(value)
        .ok_or_else(|| EngineError::MalformedInput(format!("{label} must not be empty")))?;
    let key = normalize_category_key(&display)
        .ok_or_else(|| EngineError::MalformedInput(format!("{label} must not be empty")))?;
    Ok((display, key))
}

/// First day of the month containing `date`.
pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
