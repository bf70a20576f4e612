//! Field contracts and their validation primitives.
//!
//! One [`Field`] describes one filterable attribute: which primitive
//! validates raw input, and which strategy turns the validated value into a
//! query effect. Composite and ordering behavior live in their own modules;
//! [`infer_field`] maps declared value types to concrete fields.

pub mod field;
pub mod infer;
pub(crate) mod list;
pub mod ordering;
pub(crate) mod scalar;

#[doc(inline)]
pub use field::{Field, FieldKind, Lookup, Method, MethodFn, MethodMap, MethodOutcome};

#[doc(inline)]
pub use infer::{infer_field, DataType};

#[doc(inline)]
pub use ordering::{OrderDir, OrderSpec};
