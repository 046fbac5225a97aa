//! DELETE statement builder.

use super::addition::{write_additions, Addition};
use super::ex::{Ex, RenderContext, SqlExpr};
use crate::schema::Table;

/// Entry point of a DELETE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delete;

impl Delete {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Deletes from `table`. Without a `WHERE` addition every row goes.
    #[must_use]
    pub fn from(self, table: &Table, additions: impl IntoIterator<Item = Addition>) -> StmtDelete {
        StmtDelete {
            table: table.full_name(),
            additions: additions.into_iter().collect(),
        }
    }
}

/// A complete DELETE statement.
#[derive(Debug, Clone)]
pub struct StmtDelete {
    table: String,
    additions: Vec<Addition>,
}

impl StmtDelete {
    /// Whether the statement carries a `WHERE` addition.
    #[must_use]
    pub fn has_where_clause(&self) -> bool {
        self.additions
            .iter()
            .any(|a| matches!(a, Addition::Where(c) if !c.is_nil()))
    }
}

impl SqlExpr for StmtDelete {
    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        let mut ex = Ex::new("DELETE FROM ");
        ex.write_str(&self.table);
        write_additions(&mut ex, &self.additions, ctx);
        ex
    }
}
