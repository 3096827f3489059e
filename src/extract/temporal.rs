// src/extract/temporal.rs
//! Timestamp normalization for feed `modified` values and item dates.
//!
//! Upstream publishers disagree on how to encode "when": some send epoch
//! seconds, some epoch milliseconds (as numbers or strings), some ISO-8601.
//! `parse_modified` folds all of them into epoch seconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Integers with more digits than this are treated as milliseconds.
const MAX_SECONDS_DIGITS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("malformed timestamp: {0:?}")]
    Malformed(String),
    #[error("unsupported timestamp value: {0}")]
    UnsupportedValue(String),
}

/// A raw `modified` value as it appears upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTimestamp<'a> {
    Text(&'a str),
    Integer(i64),
}

impl<'a> From<&'a str> for RawTimestamp<'a> {
    fn from(s: &'a str) -> Self {
        RawTimestamp::Text(s)
    }
}

impl<'a> From<&'a String> for RawTimestamp<'a> {
    fn from(s: &'a String) -> Self {
        RawTimestamp::Text(s.as_str())
    }
}

impl From<i64> for RawTimestamp<'_> {
    fn from(n: i64) -> Self {
        RawTimestamp::Integer(n)
    }
}

impl<'a> TryFrom<&'a Value> for RawTimestamp<'a> {
    type Error = TimestampError;

    fn try_from(v: &'a Value) -> Result<Self, Self::Error> {
        match v {
            Value::String(s) => Ok(RawTimestamp::Text(s)),
            Value::Number(n) => n
                .as_i64()
                .map(RawTimestamp::Integer)
                .ok_or_else(|| TimestampError::UnsupportedValue(n.to_string())),
            other => Err(TimestampError::UnsupportedValue(other.to_string())),
        }
    }
}

/// Parse a `modified` value into epoch seconds.
///
/// Detection order:
/// 1. integer / numeric string with at most 10 digits → seconds
/// 2. integer / numeric string with more digits → milliseconds, truncated
/// 3. ISO-8601 date-time → seconds, truncated
pub fn parse_modified<'a, T: Into<RawTimestamp<'a>>>(value: T) -> Result<i64, TimestampError> {
    match value.into() {
        RawTimestamp::Integer(n) => Ok(scale_epoch(n, digit_count(n))),
        RawTimestamp::Text(s) => {
            let t = s.trim();
            match parse_epoch_digits(t) {
                Some(res) => res,
                None => parse_iso8601(t),
            }
        }
    }
}

/// Same as [`parse_modified`] but straight from a JSON node.
pub fn parse_modified_value(value: &Value) -> Result<i64, TimestampError> {
    let raw = RawTimestamp::try_from(value)?;
    parse_modified(raw)
}

/// Parse an ISO-8601 date-time into epoch seconds (fractions truncated).
///
/// Accepts `Z` or numeric offsets; a missing offset is read as UTC, and a
/// bare calendar date as midnight UTC.
pub fn parse_iso8601(s: &str) -> Result<i64, TimestampError> {
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Ok(dt.timestamp());
    }
    // Offsets written without a colon, e.g. "+0100".
    if let Ok(dt) = DateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.timestamp());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Ok(naive.and_utc().timestamp());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().timestamp());
        }
    }
    Err(TimestampError::Malformed(s.to_string()))
}

/// `None` when `s` is not an (optionally signed) run of ASCII digits.
fn parse_epoch_digits(s: &str) -> Option<Result<i64, TimestampError>> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let parsed = s
        .parse::<i64>()
        .map(|n| scale_epoch(n, digits.len()))
        .map_err(|_| TimestampError::Malformed(s.to_string()));
    Some(parsed)
}

fn scale_epoch(n: i64, digits: usize) -> i64 {
    if digits > MAX_SECONDS_DIGITS {
        // integer division truncates toward zero
        n / 1000
    } else {
        n
    }
}

fn digit_count(n: i64) -> usize {
    n.unsigned_abs().checked_ilog10().map_or(1, |l| l as usize + 1)
}
