//! The value carrier shuttled between raw input, validation, and conditions.
//!
//! [`FilterValue`] plays two roles. On the way in it carries raw, untrusted
//! request input (strings from query parameters, native scalars and lists
//! from JSON bodies). On the way out it carries the validated internal value
//! a field produced, ready to be bound into a `sea_query` condition.
//!
//! Conversions:
//!
//! - `From` impls for the common Rust scalars and `serde_json::Value` build
//!   raw inputs ergonomically.
//! - `From<FilterValue> for sea_query::Value` binds validated values into
//!   query expressions. Durations bind as whole microseconds; lists bind as
//!   JSON (list-typed fields normally go through `IN` lookups instead, which
//!   bind element-wise).

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

/// A raw or validated filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Explicit null (JSON `null`). Distinct from an absent parameter.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
    Duration(Duration),
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Short type name used in validation messages, e.g.
    /// `Expected a list of items but got type "int".`
    pub fn type_name(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::Bool(_) => "bool",
            FilterValue::Int(_) => "int",
            FilterValue::Float(_) => "float",
            FilterValue::Str(_) => "str",
            FilterValue::Decimal(_) => "decimal",
            FilterValue::Date(_) => "date",
            FilterValue::Time(_) => "time",
            FilterValue::DateTime(_) => "datetime",
            FilterValue::Duration(_) => "duration",
            FilterValue::List(_) => "list",
        }
    }

    /// Borrow the string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list payload, if this is a `List`.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v.into())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Str(v.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Str(v)
    }
}

impl From<Decimal> for FilterValue {
    fn from(v: Decimal) -> Self {
        FilterValue::Decimal(v)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(v: NaiveDate) -> Self {
        FilterValue::Date(v)
    }
}

impl From<NaiveTime> for FilterValue {
    fn from(v: NaiveTime) -> Self {
        FilterValue::Time(v)
    }
}

impl From<DateTime<FixedOffset>> for FilterValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        FilterValue::DateTime(v)
    }
}

impl From<Duration> for FilterValue {
    fn from(v: Duration) -> Self {
        FilterValue::Duration(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        FilterValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for FilterValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => FilterValue::Null,
            serde_json::Value::Bool(b) => FilterValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FilterValue::Int(i)
                } else {
                    FilterValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => FilterValue::Str(s),
            serde_json::Value::Array(items) => {
                FilterValue::List(items.into_iter().map(FilterValue::from).collect())
            }
            serde_json::Value::Object(_) => FilterValue::Str(v.to_string()),
        }
    }
}

impl From<FilterValue> for sea_query::Value {
    fn from(v: FilterValue) -> Self {
        match v {
            FilterValue::Null => None::<String>.into(),
            FilterValue::Bool(b) => b.into(),
            FilterValue::Int(i) => i.into(),
            FilterValue::Float(f) => f.into(),
            FilterValue::Str(s) => s.into(),
            FilterValue::Decimal(d) => d.into(),
            FilterValue::Date(d) => d.into(),
            FilterValue::Time(t) => t.into(),
            FilterValue::DateTime(dt) => dt.into(),
            FilterValue::Duration(d) => duration_micros(d).into(),
            FilterValue::List(items) => {
                let json: Vec<serde_json::Value> = items.iter().map(render_json).collect();
                serde_json::Value::Array(json).into()
            }
        }
    }
}

/// Whole microseconds of a duration, saturating at the i64 bounds.
fn duration_micros(d: Duration) -> i64 {
    d.num_microseconds().unwrap_or_else(|| {
        if d > Duration::zero() {
            i64::MAX
        } else {
            i64::MIN
        }
    })
}

fn render_json(v: &FilterValue) -> serde_json::Value {
    match v {
        FilterValue::Null => serde_json::Value::Null,
        FilterValue::Bool(b) => (*b).into(),
        FilterValue::Int(i) => (*i).into(),
        FilterValue::Float(f) => (*f).into(),
        FilterValue::Str(s) => s.clone().into(),
        FilterValue::Decimal(d) => d.to_string().into(),
        FilterValue::Date(d) => d.to_string().into(),
        FilterValue::Time(t) => t.to_string().into(),
        FilterValue::DateTime(dt) => dt.to_rfc3339().into(),
        FilterValue::Duration(d) => duration_micros(*d).into(),
        FilterValue::List(items) => {
            serde_json::Value::Array(items.iter().map(render_json).collect())
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Null => write!(f, "null"),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Int(i) => write!(f, "{}", i),
            FilterValue::Float(v) => write!(f, "{}", v),
            FilterValue::Str(s) => write!(f, "{}", s),
            FilterValue::Decimal(d) => write!(f, "{}", d),
            FilterValue::Date(d) => write!(f, "{}", d),
            FilterValue::Time(t) => write!(f, "{}", t),
            FilterValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            FilterValue::Duration(d) => write!(f, "{}us", duration_micros(*d)),
            FilterValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(","))
            }
        }
    }
}
