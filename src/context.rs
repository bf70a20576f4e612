//! Opaque per-request context forwarded into filter methods.

use std::collections::BTreeMap;

/// Per-request context handed unexamined to method and callable-lookup
/// invocations.
///
/// The engine never reads it; it exists so filter methods can reach
/// request-scoped data (caller identity, tenant, feature flags) when building
/// per-user conditions.
///
/// # Example
///
/// ```
/// use sluice::Context;
///
/// let ctx = Context::new().with("user_id", serde_json::json!(42));
/// assert_eq!(ctx.get("user_id"), Some(&serde_json::json!(42)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: BTreeMap<String, serde_json::Value>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, consuming and returning the context.
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Insert an entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}
