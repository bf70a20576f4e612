//! Lookup expressions: the `attribute__operator` strings that decide which
//! comparison a field's value is bound into.
//!
//! A lookup expression names a column, optionally followed by `__` and an
//! operator suffix: `"price__gte"`, `"name__icontains"`, `"ids__in"`. A bare
//! expression (`"price"`) means equality. `condition_for` compiles one
//! expression/value pair into a `sea_query::Condition`; everything upstream
//! (negation, conjunction across fields) composes on that.
//!
//! Operator suffixes are grouped into named categories ("basic", "range",
//! "text") so filter definitions can declare whole families of derived
//! filters at once via [`process_lookups`].

use once_cell::sync::Lazy;
use sea_query::{Alias, Condition, Expr, ExprTrait, Func};

use crate::error::ConfigError;
use crate::value::FilterValue;

/// A supported comparison operator suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Exact,
    IExact,
    Ne,
    In,
    IsNull,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
}

impl Operator {
    /// Parse an operator suffix, e.g. `"gte"`.
    pub fn parse(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "exact" => Operator::Exact,
            "iexact" => Operator::IExact,
            "ne" => Operator::Ne,
            "in" => Operator::In,
            "isnull" => Operator::IsNull,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "contains" => Operator::Contains,
            "icontains" => Operator::IContains,
            "startswith" => Operator::StartsWith,
            "istartswith" => Operator::IStartsWith,
            "endswith" => Operator::EndsWith,
            "iendswith" => Operator::IEndsWith,
            _ => return None,
        })
    }

    /// The suffix form of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Exact => "exact",
            Operator::IExact => "iexact",
            Operator::Ne => "ne",
            Operator::In => "in",
            Operator::IsNull => "isnull",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::IContains => "icontains",
            Operator::StartsWith => "startswith",
            Operator::IStartsWith => "istartswith",
            Operator::EndsWith => "endswith",
            Operator::IEndsWith => "iendswith",
        }
    }
}

/// Named families of operator suffixes for bulk filter declaration.
pub static LOOKUP_CATEGORIES: Lazy<Vec<(&'static str, &'static [&'static str])>> =
    Lazy::new(|| {
        vec![
            ("basic", &["exact", "ne", "in", "isnull"][..]),
            ("range", &["gt", "gte", "lt", "lte"][..]),
            (
                "text",
                &[
                    "contains",
                    "icontains",
                    "startswith",
                    "istartswith",
                    "endswith",
                    "iendswith",
                    "iexact",
                ][..],
            ),
        ]
    });

/// Which lookups to derive for a declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupSelection {
    /// Every lookup from the field's lookup categories.
    All,
    /// An explicit list of operator suffixes.
    Only(Vec<String>),
}

/// Expand a lookup selection into a concrete suffix list.
///
/// `All` takes the union of the named categories, preserving declaration
/// order. Explicit suffixes are checked against the supported operator set.
/// `None` means no derived lookups and yields an empty list.
pub fn process_lookups(
    selection: Option<&LookupSelection>,
    categories: &[&str],
) -> Result<Vec<String>, ConfigError> {
    let Some(selection) = selection else {
        return Ok(Vec::new());
    };
    match selection {
        LookupSelection::All => {
            let mut out: Vec<String> = Vec::new();
            for category in categories {
                let members = LOOKUP_CATEGORIES
                    .iter()
                    .find(|(name, _)| name == category)
                    .map(|(_, members)| *members)
                    .ok_or_else(|| ConfigError::UnknownLookupCategory((*category).to_string()))?;
                for member in members {
                    if !out.iter().any(|existing| existing == member) {
                        out.push((*member).to_string());
                    }
                }
            }
            Ok(out)
        }
        LookupSelection::Only(lookups) => {
            for lookup in lookups {
                if Operator::parse(lookup).is_none() {
                    return Err(ConfigError::UnknownLookup(lookup.clone()));
                }
            }
            Ok(lookups.clone())
        }
    }
}

/// Split a lookup expression into its column path and operator.
///
/// The suffix after the final `__` is taken as an operator only when it is a
/// recognized suffix; otherwise the whole expression is the column path and
/// the operator is equality. `"author__name"` therefore stays one column
/// identifier, while `"author__name__icontains"` splits.
pub fn split_expr(expr: &str) -> (&str, Operator) {
    if let Some((column, suffix)) = expr.rsplit_once("__") {
        if let Some(op) = Operator::parse(suffix) {
            if !column.is_empty() {
                return (column, op);
            }
        }
    }
    (expr, Operator::Exact)
}

/// Compile one `expression = value` pair into a condition.
pub fn condition_for(expr: &str, value: &FilterValue) -> Condition {
    let (column, op) = split_expr(expr);
    let col = || Expr::col(Alias::new(column));
    let lowered = || Expr::expr(Func::lower(Expr::col(Alias::new(column))));

    let simple = match op {
        Operator::Exact => {
            if value.is_null() {
                col().is_null()
            } else {
                col().eq(value.clone())
            }
        }
        Operator::IExact => lowered().eq(value.to_string().to_lowercase()),
        Operator::Ne => col().ne(value.clone()),
        Operator::In => {
            let items: Vec<sea_query::Value> = match value {
                FilterValue::List(items) => items.iter().cloned().map(Into::into).collect(),
                other => vec![other.clone().into()],
            };
            col().is_in(items)
        }
        Operator::IsNull => {
            if is_falsy(value) {
                col().is_not_null()
            } else {
                col().is_null()
            }
        }
        Operator::Gt => col().gt(value.clone()),
        Operator::Gte => col().gte(value.clone()),
        Operator::Lt => col().lt(value.clone()),
        Operator::Lte => col().lte(value.clone()),
        Operator::Contains => col().like(format!("%{}%", value)),
        Operator::IContains => lowered().like(format!("%{}%", value.to_string().to_lowercase())),
        Operator::StartsWith => col().like(format!("{}%", value)),
        Operator::IStartsWith => lowered().like(format!("{}%", value.to_string().to_lowercase())),
        Operator::EndsWith => col().like(format!("%{}", value)),
        Operator::IEndsWith => lowered().like(format!("%{}", value.to_string().to_lowercase())),
    };
    Condition::all().add(simple)
}

fn is_falsy(value: &FilterValue) -> bool {
    match value {
        FilterValue::Bool(b) => !b,
        FilterValue::Str(s) => s.eq_ignore_ascii_case("false") || s == "0",
        FilterValue::Int(i) => *i == 0,
        _ => false,
    }
}
