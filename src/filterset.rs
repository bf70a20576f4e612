//! The filter definition registry.
//!
//! A [`FilterSet`] is the ordered collection of named [`Field`] contracts
//! describing one filterable resource, plus the named resolver methods
//! fields may reference. It is built once via [`FilterSetBuilder`], checked
//! for definition errors at build time, and shared read-only across
//! concurrent requests afterwards.
//!
//! Per request, [`FilterSet::validate_and_apply`] walks the declared fields
//! in order: absent parameters are skipped, every present parameter is
//! validated (all failures aggregate into one response), and validated
//! values are folded into the query as one conjunction of conditions plus
//! any direct query transformations.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use sea_query::Condition;

use crate::context::Context;
use crate::error::{ConfigError, FilterError, ValidationErrors};
use crate::fields::field::{Field, Method, MethodMap, MethodOutcome};
use crate::fields::infer::{infer_field, DataType};
use crate::lookup::{process_lookups, LookupSelection};
use crate::query::Query;
use crate::value::FilterValue;

/// Raw request parameters keyed by field name.
pub type Params = BTreeMap<String, FilterValue>;

/// Build a [`Params`] map from a JSON object; non-object input yields an
/// empty map.
pub fn params_from_json(value: serde_json::Value) -> Params {
    match value {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .map(|(key, value)| (key, FilterValue::from(value)))
            .collect(),
        _ => Params::new(),
    }
}

enum BuildOp {
    Field(String, Field),
    FromType(String, DataType, Vec<String>),
    WithLookups(String, Field, LookupSelection),
}

/// Declarative construction of a [`FilterSet`].
///
/// Registration order is preserved; registering a name twice replaces the
/// earlier contract in place. Definition errors (conflicting strategies,
/// unknown named methods, uninferable types) surface from [`build`].
///
/// [`build`]: FilterSetBuilder::build
///
/// # Example
///
/// ```
/// use sluice::{Field, FilterSet};
///
/// let filters = FilterSet::builder()
///     .field("amount", Field::integer().lookup_expr("amount__gte"))
///     .field("tags", Field::list(Field::string()).lookup_expr("tags__in"))
///     .build()
///     .unwrap();
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Default)]
pub struct FilterSetBuilder {
    ops: Vec<BuildOp>,
    methods: MethodMap,
}

impl FilterSetBuilder {
    /// Register a field under `name`.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.ops.push(BuildOp::Field(name.into(), field));
        self
    }

    /// Register a field inferred from a declared value type.
    pub fn field_from_type(
        mut self,
        name: impl Into<String>,
        data_type: DataType,
        lookup_categories: &[&str],
    ) -> Self {
        self.ops.push(BuildOp::FromType(
            name.into(),
            data_type,
            lookup_categories.iter().map(|c| (*c).to_string()).collect(),
        ));
        self
    }

    /// Register `base` under `name`, plus a derived field per selected
    /// lookup: `name__gte`, `name__lte`, ... each with the matching static
    /// lookup expression.
    pub fn field_with_lookups(
        mut self,
        name: impl Into<String>,
        base: Field,
        selection: LookupSelection,
    ) -> Self {
        self.ops.push(BuildOp::WithLookups(name.into(), base, selection));
        self
    }

    /// Register a named resolver method fields can reference via
    /// [`Field::method`].
    pub fn resolver<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Context, Query, &FilterValue) -> MethodOutcome + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    /// Run definition-time checks and produce the immutable [`FilterSet`].
    pub fn build(self) -> Result<FilterSet, ConfigError> {
        let FilterSetBuilder { ops, methods } = self;
        let mut fields: Vec<(String, Field)> = Vec::new();

        let register = |fields: &mut Vec<(String, Field)>,
                            name: String,
                            mut field: Field|
         -> Result<(), ConfigError> {
            field.name = Some(name.clone());
            field.check()?;
            if let Some(Method::Named(method)) = &field.method {
                if !methods.contains_key(method) {
                    return Err(ConfigError::UnknownMethod {
                        field: name,
                        method: method.clone(),
                    });
                }
            }
            match fields.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = field,
                None => fields.push((name, field)),
            }
            Ok(())
        };

        for op in ops {
            match op {
                BuildOp::Field(name, field) => register(&mut fields, name, field)?,
                BuildOp::FromType(name, data_type, categories) => {
                    let categories: Vec<&str> =
                        categories.iter().map(String::as_str).collect();
                    let field = infer_field(&data_type, &name, &categories)?;
                    register(&mut fields, name, field)?;
                }
                BuildOp::WithLookups(name, base, selection) => {
                    let categories: Vec<&str> = base
                        .lookup_categories
                        .iter()
                        .map(String::as_str)
                        .collect();
                    let suffixes = process_lookups(Some(&selection), &categories)?;
                    register(&mut fields, name.clone(), base.clone())?;
                    for suffix in suffixes {
                        let derived_name = format!("{}__{}", name, suffix);
                        let derived = base.clone().lookup_expr(derived_name.clone());
                        register(&mut fields, derived_name, derived)?;
                    }
                }
            }
        }

        Ok(FilterSet { fields, methods })
    }
}

/// The immutable, ordered set of field contracts for one filterable
/// resource.
pub struct FilterSet {
    fields: Vec<(String, Field)>,
    methods: MethodMap,
}

// The resolver closures have no useful debug form; show the fields only.
impl std::fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSet")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl FilterSet {
    /// Start building a filter set.
    pub fn builder() -> FilterSetBuilder {
        FilterSetBuilder::default()
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a registered field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field)
    }

    /// Iterate over `(name, field)` pairs in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter().map(|(name, field)| (name, field))
    }

    /// Validate raw parameters and fold every present field's effect into
    /// the query.
    ///
    /// Absent parameters are skipped; present-but-invalid parameters are
    /// aggregated and fail the whole request; on success all produced
    /// conditions are applied as one conjunction, after any direct query
    /// transformations from method or ordering fields.
    pub fn validate_and_apply(
        &self,
        params: &Params,
        ctx: &Context,
        query: Query,
    ) -> Result<Query, FilterError> {
        let mut errors = ValidationErrors::new();
        let mut conditions = Condition::all();
        let mut has_conditions = false;
        let mut query = query;

        for (name, field) in &self.fields {
            let Some(raw) = params.get(name) else {
                continue;
            };
            match field.validate(raw) {
                Err(error) => {
                    debug!("filter {} rejected input: {}", field, error);
                    errors.insert(name.clone(), error);
                }
                // Apply only while the request is still clean; a failed
                // request discards the queryset anyway.
                Ok(value) if errors.is_empty() => {
                    let (next, condition) =
                        field.apply_filter(&self.methods, ctx, query, &value)?;
                    query = next;
                    if let Some(condition) = condition {
                        conditions = conditions.add(condition);
                        has_conditions = true;
                    }
                    debug!("applied filter {}", field);
                }
                Ok(_) => {}
            }
        }

        if !errors.is_empty() {
            return Err(FilterError::Validation(errors));
        }
        if has_conditions {
            query = query.filter(conditions);
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::lookup::condition_for;

    fn params(entries: &[(&str, FilterValue)]) -> Params {
        entries
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn registration_order_is_preserved() {
        let filters = FilterSet::builder()
            .field("b", Field::integer())
            .field("a", Field::integer())
            .build()
            .unwrap();
        let names: Vec<&String> = filters.fields().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn reregistering_a_name_replaces_in_place() {
        let filters = FilterSet::builder()
            .field("a", Field::integer())
            .field("b", Field::integer())
            .field("a", Field::string())
            .build()
            .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.field("a").unwrap().kind().type_name(), "StringField");
    }

    #[test]
    fn build_rejects_method_lookup_conflict() {
        let err = FilterSet::builder()
            .field(
                "amount",
                Field::integer().method("resolve").lookup_expr("amount__gte"),
            )
            .resolver("resolve", |_, query, _| MethodOutcome::Query(query))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MethodLookupConflict { .. }));
    }

    #[test]
    fn build_rejects_unknown_named_method() {
        let err = FilterSet::builder()
            .field("amount", Field::integer().method("missing"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownMethod {
                field: "amount".into(),
                method: "missing".into(),
            }
        );
    }

    #[test]
    fn named_method_resolves_through_the_set() {
        let filters = FilterSet::builder()
            .field("amount", Field::integer().method("at_least"))
            .resolver("at_least", |_, _, value| {
                MethodOutcome::Condition(condition_for("amount__gte", value))
            })
            .build()
            .unwrap();
        let query = filters
            .validate_and_apply(
                &params(&[("amount", FilterValue::Str("10".into()))]),
                &Context::new(),
                Query::table("t"),
            )
            .unwrap();
        assert!(query.build_sql().contains(r#""amount" >= 10"#));
    }

    #[test]
    fn absent_parameters_are_skipped() {
        let filters = FilterSet::builder()
            .field("amount", Field::integer())
            .build()
            .unwrap();
        let query = filters
            .validate_and_apply(&Params::new(), &Context::new(), Query::table("t"))
            .unwrap();
        assert_eq!(query.build_sql(), r#"SELECT * FROM "t""#);
    }

    #[test]
    fn field_with_lookups_derives_suffixed_fields() {
        let filters = FilterSet::builder()
            .field_with_lookups(
                "amount",
                Field::integer(),
                LookupSelection::Only(vec!["gte".into(), "lte".into()]),
            )
            .build()
            .unwrap();
        assert_eq!(filters.len(), 3);
        assert!(filters.field("amount").is_some());
        assert!(filters.field("amount__gte").is_some());
        assert!(filters.field("amount__lte").is_some());

        let query = filters
            .validate_and_apply(
                &params(&[("amount__lte", FilterValue::Str("5".into()))]),
                &Context::new(),
                Query::table("t"),
            )
            .unwrap();
        assert!(query.build_sql().contains(r#""amount" <= 5"#));
    }

    #[test]
    fn debug_shows_the_registered_fields() {
        let filters = FilterSet::builder()
            .field("amount", Field::integer().lookup_expr("amount__gte"))
            .build()
            .unwrap();
        let rendered = format!("{:?}", filters);
        assert!(rendered.starts_with("FilterSet"), "{}", rendered);
        assert!(rendered.contains("amount"), "{}", rendered);
    }

    #[test]
    fn params_from_json_accepts_objects_only() {
        let parsed = params_from_json(serde_json::json!({"a": 1, "b": "x"}));
        assert_eq!(parsed.get("a"), Some(&FilterValue::Int(1)));
        assert_eq!(parsed.get("b"), Some(&FilterValue::Str("x".into())));

        assert!(params_from_json(serde_json::json!([1, 2])).is_empty());
    }
}
