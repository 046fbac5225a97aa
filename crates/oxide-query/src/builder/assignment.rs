//! Column assignments for `SET`, `VALUES` and upserts.
//!
//! An [`Assignment`] pairs columns with one or more rows of values. It
//! renders as `a = ?, b = ?` by default and as `(a,b) VALUES (?,?),(?,?)`
//! when [`Toggles::use_values`](super::Toggles) is on. `INSERT` switches the
//! toggle on for its value list.

use super::ex::{Ex, RenderContext, SqlExpr};
use super::value::{SqlValue, ToSqlValue};
use crate::error::{BuildError, Result};
use crate::schema::{Column, Columns};

/// Columns paired with rows of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    columns: Columns,
    values: Vec<SqlValue>,
}

/// Pairs `columns` with a flat list of values, grouped into rows of
/// `columns.len()` values.
///
/// # Errors
///
/// Fails when no column is given, or when the number of values is zero or
/// not a multiple of the number of columns.
pub fn columns_and_values<T: ToSqlValue>(
    columns: Columns,
    values: impl IntoIterator<Item = T>,
) -> Result<Assignment> {
    let values: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
    if columns.is_empty() {
        return Err(BuildError::NoColumns);
    }
    if values.is_empty() || values.len() % columns.len() != 0 {
        return Err(BuildError::ValueCount {
            columns: columns.len(),
            values: values.len(),
        });
    }
    Ok(Assignment { columns, values })
}

impl Assignment {
    #[must_use]
    pub const fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Number of value rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.values.len() / self.columns.len()
    }

    fn render_values(&self) -> Ex {
        let mut ex = Ex::default();
        ex.write_group(|ex| ex.write_str(&self.columns.names().join(",")));
        ex.write_str(" VALUES ");
        for (i, row) in self.values.chunks(self.columns.len()).enumerate() {
            if i > 0 {
                ex.write_char(',');
            }
            ex.write_group(|ex| ex.write_args(row.iter().cloned()));
        }
        ex
    }

    fn render_pairs(&self) -> Ex {
        let mut ex = Ex::default();
        for (i, (column, value)) in self.columns.iter().zip(&self.values).enumerate() {
            if i > 0 {
                ex.write_str(", ");
            }
            ex.write_str(&column.name);
            ex.write_str(" = ");
            ex.write_arg(value.clone());
        }
        ex
    }
}

impl SqlExpr for Assignment {
    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        if ctx.toggles().use_values {
            self.render_values()
        } else {
            self.render_pairs()
        }
    }
}

impl Column {
    /// Assigns one value to this column.
    #[must_use]
    pub fn value_by<T: ToSqlValue>(&self, value: T) -> Assignment {
        Assignment {
            columns: Columns::from(vec![self.clone()]),
            values: vec![value.to_sql_value()],
        }
    }
}

/// Assignments rendered one after the other, separated by `, `.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments(Vec<Assignment>);

impl Assignments {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, assignment: Assignment) {
        self.0.push(assignment);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Assignment> for Assignments {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Assignments {
    type Item = Assignment;
    type IntoIter = std::vec::IntoIter<Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Assignment> for Assignments {
    fn from(assignment: Assignment) -> Self {
        Self(vec![assignment])
    }
}

impl SqlExpr for Assignments {
    fn is_nil(&self) -> bool {
        self.0.is_empty()
    }

    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        let mut ex = Ex::default();
        for (i, assignment) in self.0.iter().enumerate() {
            if i > 0 {
                ex.write_str(", ");
            }
            ex.write_expr(assignment, ctx);
        }
        ex
    }
}
