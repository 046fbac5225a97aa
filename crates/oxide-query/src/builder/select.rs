//! SELECT statement builder.
//!
//! `Select` describes the projection; [`Select::from`] binds it to a table and
//! its additions and yields the finished [`StmtSelect`].

use std::sync::Arc;

use super::addition::{write_additions, Addition};
use super::ex::{Ex, RenderContext, SqlExpr};
use crate::schema::{Columns, Table};

#[derive(Debug, Clone)]
enum Projection {
    /// Every active column of the table, or `*` when it declares none.
    TableColumns,
    Columns(Columns),
    Expr(Arc<dyn SqlExpr>),
}

/// Projection of a SELECT, waiting for its table.
#[derive(Debug, Clone)]
pub struct Select {
    distinct: bool,
    projection: Projection,
}

impl Select {
    /// Selects all declared columns of the table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            distinct: false,
            projection: Projection::TableColumns,
        }
    }

    /// Selects the given columns.
    #[must_use]
    pub fn columns(columns: Columns) -> Self {
        Self {
            distinct: false,
            projection: Projection::Columns(columns),
        }
    }

    /// Selects an arbitrary expression such as [`count`](super::count).
    #[must_use]
    pub fn expr(expr: impl SqlExpr + 'static) -> Self {
        Self {
            distinct: false,
            projection: Projection::Expr(Arc::new(expr)),
        }
    }

    /// `SELECT DISTINCT`
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Binds the projection to `table` with the given additions.
    #[must_use]
    pub fn from(self, table: &Table, additions: impl IntoIterator<Item = Addition>) -> StmtSelect {
        let projection = match self.projection {
            Projection::TableColumns => Projection::Columns(table.active_columns()),
            other => other,
        };
        StmtSelect {
            distinct: self.distinct,
            projection,
            table: table.full_name(),
            additions: additions.into_iter().collect(),
        }
    }
}

impl Default for Select {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete SELECT statement.
#[derive(Debug, Clone)]
pub struct StmtSelect {
    distinct: bool,
    projection: Projection,
    table: String,
    additions: Vec<Addition>,
}

impl StmtSelect {
    /// Appends another addition.
    #[must_use]
    pub fn with(mut self, addition: Addition) -> Self {
        self.additions.push(addition);
        self
    }

    /// Name of the queried table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl SqlExpr for StmtSelect {
    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        let mut ex = Ex::new("SELECT ");
        if self.distinct {
            ex.write_str("DISTINCT ");
        }
        match &self.projection {
            Projection::Columns(columns) if !columns.is_empty() => {
                ex.write_str(&columns.names().join(","));
            }
            Projection::Expr(expr) => ex.write_expr(expr, ctx),
            _ => ex.write_char('*'),
        }
        ex.write_str(" FROM ");
        ex.write_str(&self.table);
        write_additions(&mut ex, &self.additions, ctx);
        ex
    }
}
