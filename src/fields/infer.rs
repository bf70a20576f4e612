//! Declared-type to field inference.
//!
//! `infer_field` is the deterministic mapping from a [`DataType`] descriptor
//! to a concrete [`Field`]. It is pure: the same descriptor always yields
//! the same field shape, which keeps definition-time behavior predictable
//! and property-testable.

use crate::error::ConfigError;
use crate::fields::field::Field;

/// A declared value type for a filterable attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Bool,
    Int,
    Float,
    Str,
    Decimal { max_digits: u32, decimal_places: u32 },
    Date,
    Time,
    DateTime,
    Duration,
    Email,
    IpAddr,
    /// A tagged/enumerated type; members become the choice keys.
    Enumeration(Vec<String>),
    /// A type with no inhabitants; only valid inside nothing, and an error
    /// anywhere a value could be expected.
    Nothing,
    /// `optional<T>`: unwraps to the field for `T`.
    Optional(Box<DataType>),
    /// `sequence<T>` or a bare sequence; `None` means unparameterized.
    Sequence(Option<Box<DataType>>),
    /// A declared type outside the supported set, carried by name for the
    /// configuration error message.
    Other(String),
}

impl DataType {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> String {
        match self {
            DataType::Bool => "bool".into(),
            DataType::Int => "int".into(),
            DataType::Float => "float".into(),
            DataType::Str => "str".into(),
            DataType::Decimal { .. } => "decimal".into(),
            DataType::Date => "date".into(),
            DataType::Time => "time".into(),
            DataType::DateTime => "datetime".into(),
            DataType::Duration => "duration".into(),
            DataType::Email => "email".into(),
            DataType::IpAddr => "ip".into(),
            DataType::Enumeration(_) => "enumeration".into(),
            DataType::Nothing => "nothing".into(),
            DataType::Optional(inner) => format!("optional<{}>", inner.name()),
            DataType::Sequence(Some(inner)) => format!("sequence<{}>", inner.name()),
            DataType::Sequence(None) => "sequence".into(),
            DataType::Other(name) => name.clone(),
        }
    }
}

/// Map a declared type to a concrete field.
///
/// Sequences become list fields with an inferred (or string-defaulting)
/// child and a synthesized `"<field_name>__in"` membership lookup.
/// Optionals unwrap; an optional of nothing is a definition-time error, as
/// is any type outside the supported set.
///
/// # Example
///
/// ```
/// use sluice::{infer_field, DataType, FieldKind};
///
/// let field = infer_field(&DataType::Sequence(Some(Box::new(DataType::Int))), "ids", &[])
///     .unwrap();
/// assert!(matches!(field.kind(), FieldKind::List { .. }));
/// ```
pub fn infer_field(
    data_type: &DataType,
    field_name: &str,
    lookup_categories: &[&str],
) -> Result<Field, ConfigError> {
    let field = match data_type {
        DataType::Bool => Field::boolean(),
        DataType::Int => Field::integer(),
        DataType::Float => Field::float(),
        DataType::Str => Field::string(),
        DataType::Decimal {
            max_digits,
            decimal_places,
        } => Field::decimal(*max_digits, *decimal_places),
        DataType::Date => Field::date(),
        DataType::Time => Field::time(),
        DataType::DateTime => Field::datetime(),
        DataType::Duration => Field::duration(),
        DataType::Email => Field::email(),
        DataType::IpAddr => Field::ip_address(),
        DataType::Enumeration(members) => Field::choice(
            members
                .iter()
                .map(|m| (m.clone(), m.clone()))
                .collect(),
        ),
        DataType::Nothing => {
            return Err(ConfigError::OptionalOfNothing {
                field: field_name.to_string(),
            })
        }
        DataType::Optional(inner) => {
            if **inner == DataType::Nothing {
                return Err(ConfigError::OptionalOfNothing {
                    field: field_name.to_string(),
                });
            }
            infer_field(inner, field_name, lookup_categories)?
        }
        DataType::Sequence(element) => {
            let child = match element {
                Some(inner) => infer_field(inner, field_name, lookup_categories)?,
                None => Field::string(),
            };
            Field::list(child).lookup_expr(format!("{}__in", field_name))
        }
        DataType::Other(name) => {
            return Err(ConfigError::UnsupportedType {
                type_name: name.clone(),
            })
        }
    };
    Ok(field.lookup_categories(lookup_categories))
}
