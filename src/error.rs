//! Error types for filter definition and request validation.
//!
//! Two disjoint error classes exist and never mix:
//!
//! - [`ValidationError`] / [`ValidationErrors`]: request-time failures.
//!   Untrusted input did not pass a field's coercion rules. These are
//!   expected, recoverable at the request boundary, and carry human-readable
//!   messages suitable for returning to the caller.
//! - [`ConfigError`]: definition-time programmer errors: a field declared
//!   with conflicting strategies, an unknown named method, an uninferable
//!   data type. These indicate a bug in the filter definition and are
//!   surfaced as early as possible (at [`FilterSet`](crate::FilterSet) build
//!   time wherever the information exists).

use std::collections::BTreeMap;

use serde::Serialize;

/// Validation failure for a single field.
///
/// Carries the list of human-readable messages produced by the field's
/// validation primitive. The owning [`FilterSet`](crate::FilterSet) attaches
/// the field name when aggregating into a [`ValidationErrors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    /// Create a validation error with a single message.
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Create a validation error from a list of messages.
    pub fn from_messages(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// The human-readable messages for this failure.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Consume the error, returning its messages.
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join(" "))
    }
}

impl std::error::Error for ValidationError {}

/// Aggregated validation failures for one request, keyed by field name.
///
/// The registry validates every declared field before failing, so a single
/// response reports all invalid parameters at once. Serializes to a JSON
/// object of `field -> [messages]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    by_field: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field's validation failure.
    pub fn insert(&mut self, field: impl Into<String>, error: ValidationError) {
        self.by_field.insert(field.into(), error.into_messages());
    }

    /// True when no field has failed.
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// Messages recorded for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.by_field.get(field).map(Vec::as_slice)
    }

    /// Number of failed fields.
    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    /// Iterate over `(field, messages)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.by_field.iter()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.by_field {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Definition-time error in a filter declaration.
///
/// These are fatal programmer errors, never produced by bad request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `method` and a non-default `lookup_expr` declared on the same field.
    MethodLookupConflict { field: String },
    /// A named method does not resolve to a registered resolver.
    UnknownMethod { field: String, method: String },
    /// A declared data type has no field inference mapping.
    UnsupportedType { type_name: String },
    /// An optional-of-nothing type (a type that can only ever be absent).
    OptionalOfNothing { field: String },
    /// A default-lookup field applied before a name was bound to it.
    UnboundField,
    /// A lookup name outside the supported operator set.
    UnknownLookup(String),
    /// A lookup category name outside the registered category table.
    UnknownLookupCategory(String),
    /// Decimal bounds where `decimal_places` exceeds `max_digits`.
    InvalidDecimalBounds {
        max_digits: u32,
        decimal_places: u32,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MethodLookupConflict { field } => write!(
                f,
                "`method` and `lookup_expr` cannot be used together (field `{}`)",
                field
            ),
            ConfigError::UnknownMethod { field, method } => write!(
                f,
                "field `{}` names method `{}`, but no such resolver is registered",
                field, method
            ),
            ConfigError::UnsupportedType { type_name } => write!(
                f,
                "no field mapping for data type `{}`; supported types: bool, int, \
                 float, str, decimal, date, time, datetime, duration, email, ip, \
                 enumeration, optional<T>, sequence<T>",
                type_name
            ),
            ConfigError::OptionalOfNothing { field } => write!(
                f,
                "field `{}` declares an optional-of-nothing type, which can never \
                 carry a value",
                field
            ),
            ConfigError::UnboundField => write!(
                f,
                "field uses its default lookup but was never bound to a name; \
                 register it on a FilterSet or set an explicit lookup_expr"
            ),
            ConfigError::UnknownLookup(name) => {
                write!(f, "unknown lookup `{}`", name)
            }
            ConfigError::UnknownLookupCategory(name) => {
                write!(f, "unknown lookup category `{}`", name)
            }
            ConfigError::InvalidDecimalBounds {
                max_digits,
                decimal_places,
            } => write!(
                f,
                "decimal_places ({}) cannot exceed max_digits ({})",
                decimal_places, max_digits
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level error for one request through a [`FilterSet`](crate::FilterSet).
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Aggregated request-time validation failures.
    Validation(ValidationErrors),
    /// A definition-time error surfaced at application time.
    Config(ConfigError),
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Validation(errors) => write!(f, "validation failed: {}", errors),
            FilterError::Config(error) => write!(f, "filter misconfigured: {}", error),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<ValidationErrors> for FilterError {
    fn from(errors: ValidationErrors) -> Self {
        FilterError::Validation(errors)
    }
}

impl From<ConfigError> for FilterError {
    fn from(error: ConfigError) -> Self {
        FilterError::Config(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_aggregate_by_field() {
        let mut errors = ValidationErrors::new();
        errors.insert("amount", ValidationError::single("A valid integer is required."));
        errors.insert(
            "tags",
            ValidationError::from_messages(vec!["bad".into(), "worse".into()]),
        );

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("amount"),
            Some(&["A valid integer is required.".to_string()][..])
        );
        assert!(errors.get("missing").is_none());
    }

    #[test]
    fn validation_errors_serialize_keyed_by_field() {
        let mut errors = ValidationErrors::new();
        errors.insert("amount", ValidationError::single("A valid integer is required."));

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"amount": ["A valid integer is required."]})
        );
    }

    #[test]
    fn config_error_conflict_message() {
        let err = ConfigError::MethodLookupConflict {
            field: "price".into(),
        };
        assert!(err
            .to_string()
            .contains("`method` and `lookup_expr` cannot be used together"));
    }
}
