//! The field contract: one declared filterable attribute.
//!
//! A [`Field`] pairs a value-validation primitive ([`FieldKind`]) with the
//! strategy that turns the validated value into a query effect: a lookup
//! expression (static string, mapping callable, or condition callable), or a
//! method (named resolver on the owning [`FilterSet`](crate::FilterSet), or a
//! bound closure). The strategies are closed enum variants resolved at
//! construction; there is no runtime probing of return types.
//!
//! Fields are immutable once a `FilterSet` is built and shared read-only
//! across requests, so every callable is `Send + Sync`.

use std::collections::BTreeMap;
use std::sync::Arc;

use sea_query::Condition;

use crate::context::Context;
use crate::error::{ConfigError, ValidationError};
use crate::fields::ordering::OrderSpec;
use crate::fields::{list, ordering, scalar};
use crate::lookup::condition_for;
use crate::query::Query;
use crate::value::FilterValue;

/// Outcome of a filter method: either a transformed query or a condition to
/// be conjoined by the registry, never both.
pub enum MethodOutcome {
    Query(Query),
    Condition(Condition),
}

/// A bound filter method: `(context, query, validated_value) -> outcome`.
pub type MethodFn = dyn Fn(&Context, Query, &FilterValue) -> MethodOutcome + Send + Sync;

/// A mapping-producing lookup callable: each `(lookup_expr, value)` pair is
/// compiled to a condition and the pairs are conjoined.
pub type MappingFn = dyn Fn(&FilterValue) -> Vec<(String, FilterValue)> + Send + Sync;

/// A condition-producing lookup callable.
pub type ConditionFn = dyn Fn(&FilterValue) -> Condition + Send + Sync;

/// Named resolver table a [`FilterSet`](crate::FilterSet) registers its
/// methods into.
pub type MethodMap = BTreeMap<String, Arc<MethodFn>>;

/// How a field's validated value becomes a comparison.
#[derive(Clone)]
pub enum Lookup {
    /// Equality against the field's own bound name.
    Default,
    /// A static lookup expression, e.g. `"price__gte"`.
    Static(String),
    /// A callable producing `(lookup_expr, value)` pairs; conjoined.
    Mapping(Arc<MappingFn>),
    /// A callable producing a ready-made condition.
    Condition(Arc<ConditionFn>),
}

impl Lookup {
    /// True for the default (field-name equality) strategy.
    pub fn is_default(&self) -> bool {
        matches!(self, Lookup::Default)
    }
}

/// The method strategy, mutually exclusive with a non-default [`Lookup`].
#[derive(Clone)]
pub enum Method {
    /// Resolved against the owning filter set's registered resolvers.
    Named(String),
    /// A closure bound directly to the field.
    Bound(Arc<MethodFn>),
}

/// The validation primitive backing a field.
#[derive(Clone)]
pub enum FieldKind {
    Boolean,
    Integer,
    Float,
    Str,
    Decimal { max_digits: u32, decimal_places: u32 },
    Date,
    Time,
    DateTime,
    Duration,
    Email,
    IpAddress,
    Choice { choices: Vec<(String, String)> },
    MultipleChoice { choices: Vec<(String, String)> },
    List { child: Box<Field> },
    Order(OrderSpec),
}

impl FieldKind {
    /// Type name used in the field's display form, e.g. `"IntegerField"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "BooleanField",
            FieldKind::Integer => "IntegerField",
            FieldKind::Float => "FloatField",
            FieldKind::Str => "StringField",
            FieldKind::Decimal { .. } => "DecimalField",
            FieldKind::Date => "DateField",
            FieldKind::Time => "TimeField",
            FieldKind::DateTime => "DateTimeField",
            FieldKind::Duration => "DurationField",
            FieldKind::Email => "EmailField",
            FieldKind::IpAddress => "IPAddressField",
            FieldKind::Choice { .. } => "ChoiceField",
            FieldKind::MultipleChoice { .. } => "MultipleChoiceField",
            FieldKind::List { .. } => "ListField",
            FieldKind::Order(_) => "OrderField",
        }
    }
}

/// One declared filterable attribute.
///
/// Construct with a kind constructor, then chain strategy setters:
///
/// ```
/// use sluice::Field;
///
/// let amount = Field::integer().lookup_expr("amount__gte");
/// let spam = Field::boolean().negate();
/// ```
#[derive(Clone)]
pub struct Field {
    pub(crate) name: Option<String>,
    pub(crate) kind: FieldKind,
    pub(crate) lookup: Lookup,
    pub(crate) method: Option<Method>,
    pub(crate) negate: bool,
    pub(crate) lookup_categories: Vec<String>,
}

impl Field {
    fn of_kind(kind: FieldKind) -> Self {
        Self {
            name: None,
            kind,
            lookup: Lookup::Default,
            method: None,
            negate: false,
            lookup_categories: Vec::new(),
        }
    }

    pub fn boolean() -> Self {
        Self::of_kind(FieldKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::of_kind(FieldKind::Integer)
    }

    pub fn float() -> Self {
        Self::of_kind(FieldKind::Float)
    }

    pub fn string() -> Self {
        Self::of_kind(FieldKind::Str)
    }

    pub fn decimal(max_digits: u32, decimal_places: u32) -> Self {
        Self::of_kind(FieldKind::Decimal {
            max_digits,
            decimal_places,
        })
    }

    pub fn date() -> Self {
        Self::of_kind(FieldKind::Date)
    }

    pub fn time() -> Self {
        Self::of_kind(FieldKind::Time)
    }

    pub fn datetime() -> Self {
        Self::of_kind(FieldKind::DateTime)
    }

    pub fn duration() -> Self {
        Self::of_kind(FieldKind::Duration)
    }

    pub fn email() -> Self {
        Self::of_kind(FieldKind::Email)
    }

    pub fn ip_address() -> Self {
        Self::of_kind(FieldKind::IpAddress)
    }

    /// A choice field over `(value, display_label)` pairs.
    pub fn choice(choices: Vec<(String, String)>) -> Self {
        Self::of_kind(FieldKind::Choice { choices })
    }

    /// A multiple-choice field over `(value, display_label)` pairs.
    pub fn multiple_choice(choices: Vec<(String, String)>) -> Self {
        Self::of_kind(FieldKind::MultipleChoice { choices })
    }

    /// A composite list field validating each element with `child`.
    pub fn list(child: Field) -> Self {
        Self::of_kind(FieldKind::List {
            child: Box::new(child),
        })
    }

    /// An ordering field over the given [`OrderSpec`].
    pub fn ordering(spec: OrderSpec) -> Self {
        Self::of_kind(FieldKind::Order(spec))
    }

    /// Set a static lookup expression, e.g. `"price__gte"`.
    pub fn lookup_expr(mut self, expr: impl Into<String>) -> Self {
        self.lookup = Lookup::Static(expr.into());
        self
    }

    /// Set a mapping-producing lookup callable. Each returned
    /// `(lookup_expr, value)` pair compiles to a condition; pairs conjoin.
    pub fn lookup_map_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&FilterValue) -> Vec<(String, FilterValue)> + Send + Sync + 'static,
    {
        self.lookup = Lookup::Mapping(Arc::new(f));
        self
    }

    /// Set a condition-producing lookup callable.
    pub fn lookup_cond_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&FilterValue) -> Condition + Send + Sync + 'static,
    {
        self.lookup = Lookup::Condition(Arc::new(f));
        self
    }

    /// Name a resolver method registered on the owning filter set.
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.method = Some(Method::Named(name.into()));
        self
    }

    /// Bind a resolver closure directly to the field.
    pub fn method_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, Query, &FilterValue) -> MethodOutcome + Send + Sync + 'static,
    {
        self.method = Some(Method::Bound(Arc::new(f)));
        self
    }

    /// Logically invert the condition this field produces.
    pub fn negate(mut self) -> Self {
        self.negate = true;
        self
    }

    /// Attach the lookup categories used when deriving lookup families.
    pub fn lookup_categories(mut self, categories: &[&str]) -> Self {
        self.lookup_categories = categories.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// The name bound at registration time, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The field's validation primitive.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Definition-time consistency checks, run when a filter set is built.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.method.is_some() && !self.lookup.is_default() {
            return Err(ConfigError::MethodLookupConflict {
                field: self.name.clone().unwrap_or_else(|| "<unbound>".into()),
            });
        }
        if let FieldKind::Decimal {
            max_digits,
            decimal_places,
        } = self.kind
        {
            if decimal_places > max_digits {
                return Err(ConfigError::InvalidDecimalBounds {
                    max_digits,
                    decimal_places,
                });
            }
        }
        if let FieldKind::List { child } = &self.kind {
            child.check()?;
        }
        Ok(())
    }

    /// Validate raw input with this field's primitive.
    pub fn validate(&self, raw: &FilterValue) -> Result<FilterValue, ValidationError> {
        match &self.kind {
            FieldKind::Boolean => scalar::validate_boolean(raw),
            FieldKind::Integer => scalar::validate_integer(raw),
            FieldKind::Float => scalar::validate_float(raw),
            FieldKind::Str => scalar::validate_string(raw),
            FieldKind::Decimal {
                max_digits,
                decimal_places,
            } => scalar::validate_decimal(*max_digits, *decimal_places, raw),
            FieldKind::Date => scalar::validate_date(raw),
            FieldKind::Time => scalar::validate_time(raw),
            FieldKind::DateTime => scalar::validate_datetime(raw),
            FieldKind::Duration => scalar::validate_duration(raw),
            FieldKind::Email => scalar::validate_email(raw),
            FieldKind::IpAddress => scalar::validate_ip(raw),
            FieldKind::Choice { choices } => scalar::validate_choice(choices, raw),
            FieldKind::MultipleChoice { choices } => {
                scalar::validate_multiple_choice(choices, raw)
            }
            FieldKind::List { child } => list::validate(child, raw),
            FieldKind::Order(spec) => ordering::validate(spec, raw),
        }
    }

    /// Resolve this field's method against the registered resolver table.
    pub fn get_method<'a>(
        &'a self,
        methods: &'a MethodMap,
    ) -> Result<&'a Arc<MethodFn>, ConfigError> {
        match self.method.as_ref() {
            Some(Method::Bound(f)) => Ok(f),
            Some(Method::Named(name)) => {
                methods.get(name).ok_or_else(|| ConfigError::UnknownMethod {
                    field: self.name.clone().unwrap_or_else(|| "<unbound>".into()),
                    method: name.clone(),
                })
            }
            None => Err(ConfigError::UnboundField),
        }
    }

    /// Turn a validated value into a query effect.
    ///
    /// Decision order: method, then callable lookup, then static or default
    /// expression. Exactly one of the returned query transformation or
    /// condition carries the effect; a produced condition is negated when
    /// the field declares `negate`.
    pub fn apply_filter(
        &self,
        methods: &MethodMap,
        ctx: &Context,
        query: Query,
        value: &FilterValue,
    ) -> Result<(Query, Option<Condition>), ConfigError> {
        if self.method.is_some() {
            let method = self.get_method(methods)?;
            return Ok(match method.as_ref()(ctx, query.clone(), value) {
                MethodOutcome::Query(next) => (next, None),
                MethodOutcome::Condition(cond) => (query, Some(self.finish(cond))),
            });
        }

        if let FieldKind::Order(spec) = &self.kind {
            return Ok((ordering::apply(spec, query, value), None));
        }

        let condition = match &self.lookup {
            Lookup::Mapping(f) => {
                let mut all = Condition::all();
                for (expr, mapped) in f(value) {
                    all = all.add(condition_for(&expr, &mapped));
                }
                all
            }
            Lookup::Condition(f) => f(value),
            Lookup::Static(expr) => condition_for(expr, value),
            Lookup::Default => {
                let name = self.name.as_deref().ok_or(ConfigError::UnboundField)?;
                condition_for(name, value)
            }
        };
        Ok((query, Some(self.finish(condition))))
    }

    fn finish(&self, condition: Condition) -> Condition {
        if self.negate {
            condition.not()
        } else {
            condition
        }
    }

    fn lookup_display(&self) -> String {
        match &self.lookup {
            Lookup::Default => self.name.clone().unwrap_or_else(|| "<default>".into()),
            Lookup::Static(expr) => expr.clone(),
            Lookup::Mapping(_) => "<mapping fn>".into(),
            Lookup::Condition(_) => "<condition fn>".into(),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(name={}, lookup_expr={})",
            self.kind.type_name(),
            self.name.as_deref().unwrap_or("-"),
            self.lookup_display()
        )
    }
}

// Debug mirrors Display; the closures have no useful debug form.
impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new()
    }

    #[test]
    fn method_and_lookup_expr_conflict_at_check() {
        let field = Field::integer()
            .method("filter_method")
            .lookup_expr("field__gte");
        let err = field.check().unwrap_err();
        assert!(matches!(err, ConfigError::MethodLookupConflict { .. }));
    }

    #[test]
    fn bound_method_returning_query_yields_no_condition() {
        let field = Field::integer().method_fn(|_, query, value| {
            let value = value.clone();
            MethodOutcome::Query(query.filter(condition_for("integer_field", &value)))
        });
        let (query, cond) = field
            .apply_filter(&MethodMap::new(), &ctx(), Query::table("t"), &FilterValue::Int(10))
            .unwrap();
        assert!(cond.is_none());
        assert!(query.build_sql().contains(r#""integer_field" = 10"#));
    }

    #[test]
    fn bound_method_returning_condition_leaves_query_untouched() {
        let field = Field::integer().method_fn(|_, _, value| {
            MethodOutcome::Condition(condition_for("integer_field", value))
        });
        let base = Query::table("t");
        let (query, cond) = field
            .apply_filter(&MethodMap::new(), &ctx(), base.clone(), &FilterValue::Int(10))
            .unwrap();
        assert!(cond.is_some());
        assert_eq!(query.build_sql(), base.build_sql());
    }

    #[test]
    fn mapping_lookup_conjoins_pairs() {
        let field = Field::integer().lookup_map_fn(|value| {
            vec![
                ("amount__gte".to_string(), value.clone()),
                ("active".to_string(), FilterValue::Bool(true)),
            ]
        });
        let (query, cond) = field
            .apply_filter(&MethodMap::new(), &ctx(), Query::table("t"), &FilterValue::Int(10))
            .unwrap();
        let sql = query.filter(cond.unwrap()).build_sql();
        assert!(sql.contains(r#""amount" >= 10"#), "{}", sql);
        assert!(sql.contains(r#""active" = TRUE"#), "{}", sql);
    }

    #[test]
    fn condition_lookup_is_used_unchanged() {
        let field =
            Field::integer().lookup_cond_fn(|value| condition_for("amount__gte", value));
        let (query, cond) = field
            .apply_filter(&MethodMap::new(), &ctx(), Query::table("t"), &FilterValue::Int(10))
            .unwrap();
        let sql = query.filter(cond.unwrap()).build_sql();
        assert!(sql.contains(r#""amount" >= 10"#), "{}", sql);
    }

    #[test]
    fn negate_wraps_the_condition() {
        let field = Field::integer().lookup_expr("integer_field").negate();
        let (query, cond) = field
            .apply_filter(&MethodMap::new(), &ctx(), Query::table("t"), &FilterValue::Int(10))
            .unwrap();
        let sql = query.filter(cond.unwrap()).build_sql();
        assert!(sql.contains("NOT"), "{}", sql);
    }

    #[test]
    fn default_lookup_requires_a_bound_name() {
        let field = Field::integer();
        let err = field
            .apply_filter(&MethodMap::new(), &ctx(), Query::table("t"), &FilterValue::Int(10))
            .unwrap_err();
        assert_eq!(err, ConfigError::UnboundField);
    }

    #[test]
    fn display_names_the_kind_and_field() {
        let mut field = Field::integer().lookup_expr("price__gte");
        field.name = Some("price".to_string());
        let rendered = field.to_string();
        assert!(rendered.contains("IntegerField"));
        assert!(rendered.contains("price"));
        assert_eq!(format!("{:?}", field), rendered);
    }
}
