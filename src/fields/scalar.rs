//! Scalar value-validation primitives.
//!
//! One function per scalar field kind, each coercing a raw [`FilterValue`]
//! into its validated internal form or failing with the kind's canonical
//! message. Message wording is part of the public contract: API consumers
//! see these strings verbatim in error responses.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::value::FilterValue;

pub(crate) const MSG_NULL: &str = "This field may not be null.";
pub(crate) const MSG_BOOLEAN: &str = "Must be a valid boolean.";
pub(crate) const MSG_INTEGER: &str = "A valid integer is required.";
pub(crate) const MSG_NUMBER: &str = "A valid number is required.";
pub(crate) const MSG_STRING: &str = "Not a valid string.";
pub(crate) const MSG_DATE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub(crate) const MSG_TIME: &str =
    "Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]].";
pub(crate) const MSG_DATETIME: &str = "Datetime has wrong format. Use one of these formats \
     instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";
pub(crate) const MSG_DURATION: &str = "Duration has wrong format. Use one of these formats \
     instead: [DD] [HH:[MM:]]ss[.uuuuuu].";
pub(crate) const MSG_DURATION_DAYS: &str =
    "The number of days must be between -999999999 and 999999999.";
pub(crate) const MSG_EMAIL: &str = "Enter a valid email address.";
pub(crate) const MSG_IP: &str = "Enter a valid IPv4 or IPv6 address.";

const MAX_DURATION_DAYS: i64 = 999_999_999;

fn fail(message: &str) -> ValidationError {
    ValidationError::single(message)
}

pub(crate) fn validate_boolean(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Bool(b) => Ok(FilterValue::Bool(*b)),
        FilterValue::Int(0) => Ok(FilterValue::Bool(false)),
        FilterValue::Int(1) => Ok(FilterValue::Bool(true)),
        FilterValue::Str(s) => {
            let lowered = s.to_ascii_lowercase();
            match lowered.as_str() {
                "true" | "t" | "on" | "1" => Ok(FilterValue::Bool(true)),
                "false" | "f" | "off" | "0" => Ok(FilterValue::Bool(false)),
                _ => Err(fail(MSG_BOOLEAN)),
            }
        }
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_BOOLEAN)),
    }
}

/// Trailing `.0`, `.00`, ... that an integer string may carry.
static RE_INT_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.0*\s*$").unwrap());

pub(crate) fn validate_integer(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Int(i) => Ok(FilterValue::Int(*i)),
        FilterValue::Float(f) if f.fract() == 0.0 => Ok(FilterValue::Int(*f as i64)),
        FilterValue::Str(s) => {
            let stripped = RE_INT_DECIMAL.replace(s.trim(), "");
            stripped
                .parse::<i64>()
                .map(FilterValue::Int)
                .map_err(|_| fail(MSG_INTEGER))
        }
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_INTEGER)),
    }
}

pub(crate) fn validate_float(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Float(f) if f.is_finite() => Ok(FilterValue::Float(*f)),
        FilterValue::Int(i) => Ok(FilterValue::Float(*i as f64)),
        FilterValue::Str(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(FilterValue::Float(f)),
            _ => Err(fail(MSG_NUMBER)),
        },
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_NUMBER)),
    }
}

pub(crate) fn validate_string(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Str(s) => Ok(FilterValue::Str(s.clone())),
        FilterValue::Int(i) => Ok(FilterValue::Str(i.to_string())),
        FilterValue::Float(f) => Ok(FilterValue::Str(f.to_string())),
        FilterValue::Decimal(d) => Ok(FilterValue::Str(d.to_string())),
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_STRING)),
    }
}

pub(crate) fn validate_decimal(
    max_digits: u32,
    decimal_places: u32,
    raw: &FilterValue,
) -> Result<FilterValue, ValidationError> {
    let value = match raw {
        FilterValue::Decimal(d) => *d,
        FilterValue::Int(i) => Decimal::from(*i),
        FilterValue::Float(f) => Decimal::from_f64(*f).ok_or_else(|| fail(MSG_NUMBER))?,
        FilterValue::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(fail(MSG_NUMBER));
            }
            trimmed
                .parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| fail(MSG_NUMBER))?
        }
        FilterValue::Null => return Err(fail(MSG_NULL)),
        _ => return Err(fail(MSG_NUMBER)),
    };
    check_precision(value, max_digits, decimal_places)?;
    Ok(FilterValue::Decimal(value))
}

/// Digit-count precision check mirroring the classic serializer rules:
/// total significant digits, then decimal places, then whole digits.
fn check_precision(
    value: Decimal,
    max_digits: u32,
    decimal_places: u32,
) -> Result<(), ValidationError> {
    let mantissa = value.mantissa().unsigned_abs();
    let digit_count = if mantissa == 0 {
        1
    } else {
        let mut n = mantissa;
        let mut count = 0u32;
        while n > 0 {
            n /= 10;
            count += 1;
        }
        count
    };
    let scale = value.scale();

    let (total, whole, places) = if scale == 0 {
        (digit_count, digit_count, 0)
    } else if digit_count > scale {
        (digit_count, digit_count - scale, scale)
    } else {
        (scale, 0, scale)
    };

    if total > max_digits {
        return Err(fail(&format!(
            "Ensure that there are no more than {} digits in total.",
            max_digits
        )));
    }
    if places > decimal_places {
        return Err(fail(&format!(
            "Ensure that there are no more than {} decimal places.",
            decimal_places
        )));
    }
    let max_whole = max_digits - decimal_places;
    if whole > max_whole {
        return Err(fail(&format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_whole
        )));
    }
    Ok(())
}

pub(crate) fn validate_date(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Date(d) => Ok(FilterValue::Date(*d)),
        FilterValue::Str(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(FilterValue::Date)
            .map_err(|_| fail(MSG_DATE)),
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_DATE)),
    }
}

pub(crate) fn validate_time(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Time(t) => Ok(FilterValue::Time(*t)),
        FilterValue::Str(s) => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(FilterValue::Time)
            .map_err(|_| fail(MSG_TIME)),
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_TIME)),
    }
}

pub(crate) fn validate_datetime(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::DateTime(dt) => Ok(FilterValue::DateTime(*dt)),
        FilterValue::Str(s) => parse_datetime(s)
            .map(FilterValue::DateTime)
            .ok_or_else(|| fail(MSG_DATETIME)),
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_DATETIME)),
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt);
    }
    // No offset given: interpret as UTC.
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()?;
    Some(Utc.from_utc_datetime(&naive).fixed_offset())
}

pub(crate) fn validate_duration(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Duration(d) => {
            check_duration_days(d.num_days())?;
            Ok(FilterValue::Duration(*d))
        }
        FilterValue::Int(secs) => Ok(FilterValue::Duration(Duration::seconds(*secs))),
        FilterValue::Str(s) => parse_duration(s).map(FilterValue::Duration),
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_DURATION)),
    }
}

fn check_duration_days(days: i64) -> Result<(), ValidationError> {
    if !(-MAX_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&days) {
        return Err(fail(MSG_DURATION_DAYS));
    }
    Ok(())
}

static RE_DURATION_DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d{1,12}$").unwrap());
static RE_DURATION_HMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})(?:[.,](\d{1,6}))?$").unwrap());
static RE_DURATION_MS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{1,2})(?:[.,](\d{1,6}))?$").unwrap());
static RE_DURATION_S: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:[.,](\d{1,6}))?$").unwrap());

/// Parse the `[DD] [HH:[MM:]]ss[.uuuuuu]` duration form.
fn parse_duration(input: &str) -> Result<Duration, ValidationError> {
    let (days, time_part) = match input.split_once(' ') {
        Some((days_part, rest)) => {
            if !RE_DURATION_DAYS.is_match(days_part) {
                return Err(fail(MSG_DURATION));
            }
            let days: i64 = days_part.parse().map_err(|_| fail(MSG_DURATION_DAYS))?;
            check_duration_days(days)?;
            (days, rest)
        }
        None => (0, input),
    };

    let (negated, time_part) = match time_part.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, time_part),
    };

    let (hours, minutes, seconds, micros) = if let Some(caps) = RE_DURATION_HMS.captures(time_part)
    {
        (
            field_u64(&caps, 1),
            field_u64(&caps, 2),
            field_u64(&caps, 3),
            micros_of(&caps, 4),
        )
    } else if let Some(caps) = RE_DURATION_MS.captures(time_part) {
        (0, field_u64(&caps, 1), field_u64(&caps, 2), micros_of(&caps, 3))
    } else if let Some(caps) = RE_DURATION_S.captures(time_part) {
        (0, 0, field_u64(&caps, 1), micros_of(&caps, 2))
    } else {
        return Err(fail(MSG_DURATION));
    };

    let mut time_secs = (hours * 3600 + minutes * 60 + seconds) as i64;
    let mut time_micros = micros as i64;
    if negated {
        time_secs = -time_secs;
        time_micros = -time_micros;
    }

    Duration::try_days(days)
        .and_then(|d| d.checked_add(&Duration::seconds(time_secs)))
        .and_then(|d| d.checked_add(&Duration::microseconds(time_micros)))
        .ok_or_else(|| fail(MSG_DURATION_DAYS))
}

fn field_u64(caps: &regex::Captures<'_>, index: usize) -> u64 {
    caps.get(index)
        .map(|m| m.as_str().parse().unwrap_or(0))
        .unwrap_or(0)
}

/// Fractional seconds, right-padded to six digits of microseconds.
fn micros_of(caps: &regex::Captures<'_>, index: usize) -> u64 {
    caps.get(index)
        .map(|m| {
            let mut digits = m.as_str().to_string();
            while digits.len() < 6 {
                digits.push('0');
            }
            digits.parse().unwrap_or(0)
        })
        .unwrap_or(0)
}

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.+_%-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$").unwrap());

pub(crate) fn validate_email(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Str(s) if RE_EMAIL.is_match(s) => Ok(FilterValue::Str(s.clone())),
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_EMAIL)),
    }
}

pub(crate) fn validate_ip(raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    match raw {
        FilterValue::Str(s) => s
            .parse::<std::net::IpAddr>()
            .map(|ip| FilterValue::Str(ip.to_string()))
            .map_err(|_| fail(MSG_IP)),
        FilterValue::Null => Err(fail(MSG_NULL)),
        _ => Err(fail(MSG_IP)),
    }
}

pub(crate) fn validate_choice(
    choices: &[(String, String)],
    raw: &FilterValue,
) -> Result<FilterValue, ValidationError> {
    let key = match raw {
        FilterValue::Str(s) => s.clone(),
        FilterValue::Int(i) => i.to_string(),
        FilterValue::Null => return Err(fail(MSG_NULL)),
        other => other.to_string(),
    };
    if choices.iter().any(|(value, _)| *value == key) {
        Ok(FilterValue::Str(key))
    } else {
        Err(fail(&format!("\"{}\" is not a valid choice.", key)))
    }
}

pub(crate) fn validate_multiple_choice(
    choices: &[(String, String)],
    raw: &FilterValue,
) -> Result<FilterValue, ValidationError> {
    let items: Vec<FilterValue> = match raw {
        FilterValue::List(items) => items.clone(),
        FilterValue::Str(s) => s
            .split(',')
            .map(|seg| FilterValue::Str(seg.trim().to_string()))
            .collect(),
        FilterValue::Null => return Err(fail(MSG_NULL)),
        other => {
            return Err(fail(&format!(
                "Expected a list of items but got type \"{}\".",
                other.type_name()
            )))
        }
    };

    let mut validated = Vec::with_capacity(items.len());
    let mut messages = Vec::new();
    for item in &items {
        match validate_choice(choices, item) {
            Ok(value) => validated.push(value),
            Err(error) => messages.extend(error.into_messages()),
        }
    }
    if messages.is_empty() {
        Ok(FilterValue::List(validated))
    } else {
        Err(ValidationError::from_messages(messages))
    }
}
