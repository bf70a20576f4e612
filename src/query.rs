//! Chainable select-query builder the filter layer targets.
//!
//! `Query` is the "queryset" side of the engine: an opaque, chainable wrapper
//! over a `sea_query::SelectStatement`. Fields and the registry only ever
//! call `filter`, `exclude`, and `order_by` on it; execution belongs to
//! whatever data-access layer the host application uses. `build_sql` renders
//! Postgres syntax with inline values and exists for tests and diagnostics.
//!
//! Every operation consumes and returns the builder, so request handling
//! threads a single owned value through the filter pipeline.

use sea_query::{Alias, Iden, IntoCondition, Order, PostgresQueryBuilder, SelectStatement};

struct TableName(String);

impl Iden for TableName {
    fn unquoted(&self) -> &str {
        &self.0
    }
}

/// A progressively filtered and ordered collection query.
///
/// # Example
///
/// ```
/// use sluice::Query;
/// use sea_query::{Alias, Expr, ExprTrait, Order};
///
/// let sql = Query::table("products")
///     .filter(Expr::col(Alias::new("price")).gt(10))
///     .order_by("name", Order::Asc)
///     .build_sql();
/// assert!(sql.contains("WHERE"));
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    stmt: SelectStatement,
}

impl Query {
    /// Start a `SELECT * FROM table` query.
    pub fn table(name: impl Into<String>) -> Self {
        let mut stmt = SelectStatement::default();
        stmt.column(sea_query::Asterisk).from(TableName(name.into()));
        Self { stmt }
    }

    /// Restrict the query with a condition. Repeated calls conjoin.
    pub fn filter<F>(mut self, condition: F) -> Self
    where
        F: IntoCondition,
    {
        self.stmt.cond_where(condition.into_condition());
        self
    }

    /// Restrict the query with the negation of a condition.
    pub fn exclude<F>(self, condition: F) -> Self
    where
        F: IntoCondition,
    {
        self.filter(condition.into_condition().not())
    }

    /// Append an ORDER BY clause for a dynamically named column.
    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.stmt.order_by(Alias::new(column), order);
        self
    }

    /// Add a LIMIT clause.
    pub fn limit(mut self, limit: u64) -> Self {
        self.stmt.limit(limit);
        self
    }

    /// Add an OFFSET clause.
    pub fn offset(mut self, offset: u64) -> Self {
        self.stmt.offset(offset);
        self
    }

    /// Render the query as Postgres SQL with inline values.
    ///
    /// Intended for tests and logging; real execution should bind the
    /// underlying statement through the host's data-access layer.
    pub fn build_sql(&self) -> String {
        self.stmt.to_string(PostgresQueryBuilder)
    }

    /// Borrow the underlying statement for execution layers that bind it.
    pub fn statement(&self) -> &SelectStatement {
        &self.stmt
    }
}
