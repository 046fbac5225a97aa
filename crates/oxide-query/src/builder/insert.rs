//! INSERT statement builder.

use super::addition::{write_additions, Addition};
use super::assignment::{columns_and_values, Assignment};
use super::ex::{Ex, RenderContext, SqlExpr};
use super::value::ToSqlValue;
use crate::error::Result;
use crate::schema::{Columns, Table};

/// Entry point of an INSERT.
#[derive(Debug, Clone, Copy, Default)]
pub struct Insert;

impl Insert {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Targets `table`; additions typically hold an upsert or a comment.
    #[must_use]
    pub fn into_table(self, table: &Table, additions: impl IntoIterator<Item = Addition>) -> InsertInto {
        InsertInto {
            table: table.full_name(),
            additions: additions.into_iter().collect(),
        }
    }
}

/// An INSERT waiting for its values.
#[derive(Debug, Clone)]
pub struct InsertInto {
    table: String,
    additions: Vec<Addition>,
}

impl InsertInto {
    /// Inserts one or more rows; `values` is a flat list of rows of
    /// `columns.len()` values each.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ValueCount`](crate::BuildError::ValueCount) when
    /// the number of values is zero or not a multiple of the column count.
    pub fn values<T: ToSqlValue>(
        self,
        columns: Columns,
        values: impl IntoIterator<Item = T>,
    ) -> Result<StmtInsert> {
        Ok(self.assignment(columns_and_values(columns, values)?))
    }

    /// Inserts the rows of a prepared assignment.
    #[must_use]
    pub fn assignment(self, assignment: Assignment) -> StmtInsert {
        StmtInsert {
            table: self.table,
            assignment,
            additions: self.additions,
        }
    }
}

/// A complete INSERT statement.
#[derive(Debug, Clone)]
pub struct StmtInsert {
    table: String,
    assignment: Assignment,
    additions: Vec<Addition>,
}

impl StmtInsert {
    /// Number of inserted rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.assignment.rows()
    }
}

impl SqlExpr for StmtInsert {
    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        let mut ex = Ex::new("INSERT INTO ");
        ex.write_str(&self.table);
        ex.write_char(' ');
        let values_ctx = ctx.with_toggles(ctx.toggles().with_use_values(true));
        ex.write_expr(&self.assignment, &values_ctx);
        write_additions(&mut ex, &self.additions, ctx);
        ex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::addition::{comment, on_conflict};
    use crate::builder::ex::render;
    use crate::builder::expr::{col, cols};
    use crate::builder::value::SqlValue;
    use crate::error::BuildError;

    #[test]
    fn test_insert_multiple_rows() {
        let stmt = Insert::new()
            .into_table(&Table::new("T"), [])
            .values(cols(["a", "b"]), [1, 2, 3, 4])
            .unwrap();
        let ex = render(&stmt);
        assert_eq!(ex.sql(), "INSERT INTO T (a,b) VALUES (?,?),(?,?)");
        assert_eq!(
            ex.args(),
            &[
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Int(4)
            ]
        );
        assert_eq!(stmt.rows(), 2);
    }

    #[test]
    fn test_insert_rejects_partial_row() {
        let err = Insert::new()
            .into_table(&Table::new("T"), [])
            .values(cols(["a", "b"]), [1, 2, 3])
            .unwrap_err();
        assert_eq!(err, BuildError::ValueCount { columns: 2, values: 3 });
    }

    #[test]
    fn test_insert_with_additions() {
        let stmt = Insert::new()
            .into_table(
                &Table::new("T"),
                [
                    comment("seed"),
                    on_conflict(cols(["a"])).do_update(col("b").value_by(9)),
                ],
            )
            .values(cols(["a", "b"]), [1, 2])
            .unwrap();
        let ex = render(&stmt);
        assert_eq!(
            ex.sql(),
            "INSERT INTO T (a,b) VALUES (?,?)\nON CONFLICT (a) DO UPDATE SET b = ?\n/* seed */"
        );
        assert_eq!(ex.args().last(), Some(&SqlValue::Int(9)));
    }
}
