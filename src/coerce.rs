//! Type coercers: native argument values to wire strings.
//!
//! Each `ValueType` accepts a small set of native shapes and emits one
//! canonical string. Lists and mappings never coerce; the engine flattens
//! them before individual elements reach this module.

use crate::args::ArgValue;
use crate::catalog::ValueType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

// Integral values below this magnitude print without a fractional part or
// exponent; f64 still represents every integer in range exactly.
const INTEGRAL_PRINT_LIMIT: f64 = 1e15;

#[derive(Clone, Debug, Error, PartialEq)]
#[error("expected {expected}, got {found}")]
pub struct CoercionError {
    pub expected: ValueType,
    pub found: String,
}

/// Coerce `value` into the wire representation required by `value_type`.
pub fn coerce(value_type: ValueType, value: &ArgValue) -> Result<String, CoercionError> {
    let coerced = match value_type {
        ValueType::String => stringify(value),
        ValueType::Boolean => coerce_boolean(value),
        ValueType::Number => coerce_number(value),
        ValueType::Date => coerce_date(value).map(format_date),
        ValueType::Raw => match value {
            ArgValue::String(s) => Some(s.clone()),
            _ => None,
        },
    };
    coerced.ok_or_else(|| CoercionError {
        expected: value_type,
        found: describe(value),
    })
}

/// Plain string form of a scalar, used for enum membership checks and for
/// `string`-typed parameters. Returns `None` for lists, mappings and
/// non-finite numbers.
pub fn stringify(value: &ArgValue) -> Option<String> {
    match value {
        ArgValue::String(s) => Some(s.clone()),
        ArgValue::Bool(b) => Some(b.to_string()),
        ArgValue::Number(n) => canonical_number(*n),
        ArgValue::Date(dt) => Some(format_date(*dt)),
        ArgValue::Null | ArgValue::List(_) | ArgValue::Map(_) => None,
    }
}

fn coerce_boolean(value: &ArgValue) -> Option<String> {
    match value {
        ArgValue::Bool(b) => Some(b.to_string()),
        ArgValue::String(s) if s.eq_ignore_ascii_case("true") => Some("true".to_string()),
        ArgValue::String(s) if s.eq_ignore_ascii_case("false") => Some("false".to_string()),
        _ => None,
    }
}

fn coerce_number(value: &ArgValue) -> Option<String> {
    match value {
        ArgValue::Number(n) => canonical_number(*n),
        ArgValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            canonical_number(trimmed.parse::<f64>().ok()?)
        }
        _ => None,
    }
}

fn coerce_date(value: &ArgValue) -> Option<DateTime<Utc>> {
    match value {
        ArgValue::Date(dt) => Some(*dt),
        ArgValue::String(s) => parse_date(s.trim()),
        // Integral numbers are epoch milliseconds.
        ArgValue::Number(n) if n.is_finite() && n.fract() == 0.0 => {
            DateTime::from_timestamp_millis(*n as i64)
        }
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Offset-less timestamps are taken as UTC.
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

fn format_date(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn canonical_number(n: f64) -> Option<String> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < INTEGRAL_PRINT_LIMIT {
        return Some(format!("{}", n as i64));
    }
    Some(format!("{n}"))
}

fn describe(value: &ArgValue) -> String {
    match value {
        ArgValue::String(s) => format!("string '{s}'"),
        ArgValue::Number(n) => format!("number {n}"),
        other => other.kind().to_string(),
    }
}
