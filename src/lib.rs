//! # Sluice
//!
//! Declarative query-parameter filtering for sea-query backed services.
//!
//! Sluice validates untrusted request parameters against declared field
//! contracts and compiles every validated value into a `sea_query`
//! condition or query transformation, folded into one chainable select
//! query. Definitions are built once and shared read-only across requests;
//! all per-request state lives on the calling stack.
//!
//! # Architecture
//!
//! - **Fields**: one [`Field`] per filterable attribute, pairing a
//!   validation primitive with a lookup or method strategy
//! - **Lookups**: `attribute__operator` expression parsing and condition
//!   compilation ([`lookup`])
//! - **Inference**: declared-type to field mapping ([`infer_field`])
//! - **Registry**: the ordered [`FilterSet`] driving validation and
//!   application for one request
//! - **Query**: the chainable select builder the effects land on
//!
//! # Example
//!
//! ```
//! use sluice::{Context, Field, FilterSet, Query, params_from_json};
//!
//! let filters = FilterSet::builder()
//!     .field("amount", Field::integer().lookup_expr("amount__gte"))
//!     .field("tags", Field::list(Field::string()).lookup_expr("tags__in"))
//!     .build()
//!     .unwrap();
//!
//! let params = params_from_json(serde_json::json!({
//!     "amount": "10",
//!     "tags": "a,b",
//! }));
//! let query = filters
//!     .validate_and_apply(&params, &Context::new(), Query::table("orders"))
//!     .unwrap();
//! assert!(query.build_sql().contains("WHERE"));
//! ```

pub mod context;
pub mod error;
pub mod fields;
pub mod filterset;
pub mod lookup;
pub mod query;
pub mod value;

#[doc(inline)]
pub use context::Context;
#[doc(inline)]
pub use error::{ConfigError, FilterError, ValidationError, ValidationErrors};
#[doc(inline)]
pub use fields::{
    infer_field, DataType, Field, FieldKind, Lookup, Method, MethodMap, MethodOutcome, OrderDir,
    OrderSpec,
};
#[doc(inline)]
pub use filterset::{params_from_json, FilterSet, FilterSetBuilder, Params};
#[doc(inline)]
pub use lookup::{process_lookups, LookupSelection, Operator};
#[doc(inline)]
pub use query::Query;
#[doc(inline)]
pub use value::FilterValue;
