//! Multi-attribute ordering: expand sortable attributes into directional
//! variants and apply the requested ordering to the query.
//!
//! Convention: no prefix means ascending, a leading `-` means descending.
//! Every declared attribute gets both variants; display labels carry a
//! direction suffix instead of duplicating it into the label text. An
//! optional `override_order_dir` pins the applied direction regardless of
//! the request-supplied prefix.

use sea_query::Order;

use crate::error::ValidationError;
use crate::fields::scalar;
use crate::query::Query;
use crate::value::FilterValue;

const SUFFIX_ASC: &str = " - Ascending";
const SUFFIX_DESC: &str = " - Descending";

/// A forced ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    fn to_order(self) -> Order {
        match self {
            OrderDir::Asc => Order::Asc,
            OrderDir::Desc => Order::Desc,
        }
    }
}

/// Declared sortable attributes for one ordering field.
#[derive(Debug, Clone, Default)]
pub struct OrderSpec {
    fields: Vec<(String, String)>,
    labels: Vec<(String, String)>,
    override_order_dir: Option<OrderDir>,
}

impl OrderSpec {
    /// Declare sortable `(attribute_key, key)` pairs.
    ///
    /// # Example
    ///
    /// ```
    /// use sluice::OrderSpec;
    ///
    /// let spec = OrderSpec::new(&[("price", "price"), ("name", "name")]);
    /// assert_eq!(spec.expanded_fields().len(), 4);
    /// ```
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            labels: Vec::new(),
            override_order_dir: None,
        }
    }

    /// Attach explicit `(attribute_key, display_label)` pairs.
    pub fn with_labels(mut self, labels: &[(&str, &str)]) -> Self {
        self.labels = labels
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self
    }

    /// Force every requested key to sort in `dir`, ignoring `-` prefixes.
    pub fn with_override(mut self, dir: OrderDir) -> Self {
        self.override_order_dir = Some(dir);
        self
    }

    /// The declared pairs expanded into ascending and descending variants.
    pub fn expanded_fields(&self) -> Vec<(String, String)> {
        process_fields(&self.fields)
    }

    /// The declared labels expanded so the `-` variant shares its positive
    /// counterpart's label.
    pub fn expanded_labels(&self) -> Vec<(String, String)> {
        process_labels(if self.labels.is_empty() {
            None
        } else {
            Some(&self.labels)
        })
    }

    /// Display choices with direction suffixes applied.
    pub fn choices(&self) -> Vec<(String, String)> {
        let raw = if self.labels.is_empty() {
            self.expanded_fields()
        } else {
            self.expanded_labels()
        };
        self.process_choices(&raw)
    }

    /// Append a direction suffix to each choice's display label.
    ///
    /// Without an override, the suffix follows each key's own prefix. With
    /// an override every key means the forced direction, and the output has
    /// exactly as many choices as the input.
    pub fn process_choices(&self, raw_choices: &[(String, String)]) -> Vec<(String, String)> {
        raw_choices
            .iter()
            .map(|(key, label)| {
                let suffix = match self.override_order_dir {
                    Some(OrderDir::Asc) => SUFFIX_ASC,
                    Some(OrderDir::Desc) => SUFFIX_DESC,
                    None => {
                        if key.starts_with('-') {
                            SUFFIX_DESC
                        } else {
                            SUFFIX_ASC
                        }
                    }
                };
                (key.clone(), format!("{}{}", label, suffix))
            })
            .collect()
    }
}

/// Emit ascending and descending variants for each declared pair.
pub fn process_fields(pairs: &[(String, String)]) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(pairs.len() * 2);
    for (key, value) in pairs {
        out.push((key.clone(), value.clone()));
        out.push((format!("-{}", key), format!("-{}", value)));
    }
    out
}

/// Emit labels for both variants; the `-` variant keeps the positive label.
/// `None` yields an empty result.
pub fn process_labels(labels: Option<&[(String, String)]>) -> Vec<(String, String)> {
    let Some(labels) = labels else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(labels.len() * 2);
    for (key, label) in labels {
        out.push((key.clone(), label.clone()));
        out.push((format!("-{}", key), label.clone()));
    }
    out
}

/// Validate the requested ordering keys against the expanded variants.
pub(crate) fn validate(spec: &OrderSpec, raw: &FilterValue) -> Result<FilterValue, ValidationError> {
    scalar::validate_multiple_choice(&spec.expanded_fields(), raw)
}

/// Apply the validated ordering keys to the query, in request order.
pub(crate) fn apply(spec: &OrderSpec, query: Query, value: &FilterValue) -> Query {
    let keys: Vec<&str> = match value {
        FilterValue::List(items) => items.iter().filter_map(FilterValue::as_str).collect(),
        FilterValue::Str(s) => vec![s.as_str()],
        _ => Vec::new(),
    };

    let mut query = query;
    for key in keys {
        let (base, descending) = match key.strip_prefix('-') {
            Some(base) => (base, true),
            None => (key, false),
        };
        let order = match spec.override_order_dir {
            Some(dir) => dir.to_order(),
            None if descending => Order::Desc,
            None => Order::Asc,
        };
        query = query.order_by(base, order);
    }
    query
}
