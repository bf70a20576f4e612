//! Composite list validation: delegate each element to a child field.

use crate::error::ValidationError;
use crate::fields::field::Field;
use crate::value::FilterValue;

/// Validate a collection input element-wise against `child`.
///
/// Native lists validate as-is. Text splits on commas, with surrounding
/// whitespace trimmed per segment; empty segments are kept so the child
/// decides whether empty input is acceptable. Any other shape is rejected
/// with the canonical "expected a list" message. Per-element failures are
/// accumulated so one response reports every bad element.
pub(crate) fn validate(child: &Field, raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    let items: Vec<FilterValue> = match raw {
        FilterValue::List(items) => items.clone(),
        FilterValue::Str(s) => s
            .split(',')
            .map(|segment| FilterValue::Str(segment.trim().to_string()))
            .collect(),
        other => {
            return Err(ValidationError::single(format!(
                "Expected a list of items but got type \"{}\".",
                other.type_name()
            )))
        }
    };

    let mut validated = Vec::with_capacity(items.len());
    let mut messages = Vec::new();
    for item in &items {
        match child.validate(item) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_with_integer_child() {
        let field = Field::list(Field::integer());
        assert_eq!(
            field.validate(&FilterValue::Str("1,2,3".into())).unwrap(),
            FilterValue::List(vec![
                FilterValue::Int(1),
                FilterValue::Int(2),
                FilterValue::Int(3),
            ])
        );
    }

    #[test]
    fn interior_whitespace_is_trimmed() {
        let field = Field::list(Field::integer());
        assert_eq!(
            field.validate(&FilterValue::Str("1, 2, 3".into())).unwrap(),
            FilterValue::List(vec![
                FilterValue::Int(1),
                FilterValue::Int(2),
                FilterValue::Int(3),
            ])
        );
    }

    #[test]
    fn native_list_passes_through_child_validation() {
        let field = Field::list(Field::integer());
        assert_eq!(
            field
                .validate(&FilterValue::List(vec![
                    FilterValue::Int(1),
                    FilterValue::Int(2),
                    FilterValue::Int(3),
                ]))
                .unwrap(),
            FilterValue::List(vec![
                FilterValue::Int(1),
                FilterValue::Int(2),
                FilterValue::Int(3),
            ])
        );
    }

    #[test]
    fn non_list_shape_reports_the_actual_type() {
        let field = Field::list(Field::string());
        let err = field.validate(&FilterValue::Int(1)).unwrap_err();
        assert_eq!(
            err.messages(),
            ["Expected a list of items but got type \"int\"."]
        );
    }

    #[test]
    fn invalid_elements_accumulate() {
        let field = Field::list(Field::integer());
        let err = field.validate(&FilterValue::Str("a,b,3,4".into())).unwrap_err();
        assert_eq!(err.messages().len(), 2);
        assert!(err.messages().iter().all(|m| m == "A valid integer is required."));
    }

    #[test]
    fn empty_segments_reach_the_child() {
        // A string child accepts empty segments; an integer child rejects them.
        let field = Field::list(Field::string());
        assert_eq!(
            field.validate(&FilterValue::Str("a,,b".into())).unwrap(),
            FilterValue::List(vec![
                FilterValue::Str("a".into()),
                FilterValue::Str("".into()),
                FilterValue::Str("b".into()),
            ])
        );

        let field = Field::list(Field::integer());
        assert!(field.validate(&FilterValue::Str("1,,2".into())).is_err());
    }
}
