//! UPDATE statement builder.

use super::addition::{where_clause, write_additions, Addition};
use super::assignment::Assignments;
use super::condition::Condition;
use super::ex::{Ex, RenderContext, SqlExpr};
use crate::schema::Table;

/// A complete UPDATE statement.
///
/// ```rust
/// use oxide_query::builder::{col, render, Update};
/// use oxide_query::schema::Table;
///
/// let stmt = Update::table(&Table::new("T"))
///     .set(col("a").value_by(1))
///     .where_clause(col("b").eq(2));
/// assert_eq!(render(&stmt).sql(), "UPDATE T SET a = ?\nWHERE b = ?");
/// ```
#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    assignments: Assignments,
    additions: Vec<Addition>,
}

impl Update {
    /// Starts an UPDATE of `table`.
    #[must_use]
    pub fn table(table: &Table) -> Self {
        Self {
            table: table.full_name(),
            assignments: Assignments::new(),
            additions: Vec::new(),
        }
    }

    /// Adds assignments to the `SET` list.
    #[must_use]
    pub fn set(mut self, assignments: impl Into<Assignments>) -> Self {
        for assignment in assignments.into() {
            self.assignments.push(assignment);
        }
        self
    }

    /// Restricts the updated rows. Repeated calls are `AND`ed.
    #[must_use]
    pub fn where_clause(self, condition: impl Into<Condition>) -> Self {
        self.with(where_clause(condition))
    }

    /// Appends an addition.
    #[must_use]
    pub fn with(mut self, addition: Addition) -> Self {
        self.additions.push(addition);
        self
    }

    /// Whether there is nothing to set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Nothing to set makes the statement nil: it renders empty and executors
/// skip it.
impl SqlExpr for Update {
    fn is_nil(&self) -> bool {
        self.assignments.is_nil()
    }

    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        if self.is_nil() {
            return Ex::default();
        }
        let mut ex = Ex::new("UPDATE ");
        ex.write_str(&self.table);
        ex.write_str(" SET ");
        ex.write_expr(&self.assignments, ctx);
        write_additions(&mut ex, &self.additions, ctx);
        ex
    }
}
