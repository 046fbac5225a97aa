//! Clauses appended after the head of a statement.
//!
//! Additions may be passed in any order; they are rendered in a fixed clause
//! order, one clause per line. Several additions of the same kind merge in
//! the order they were given: conditions are `AND`ed, column and sort lists
//! are concatenated, comments each get a line, and for `LIMIT` and upserts
//! the last one wins.

use super::assignment::Assignments;
use super::condition::{and, Condition};
use super::ex::{Ex, RenderContext, SqlExpr};
use super::expr::Order;
use crate::schema::Columns;

/// A clause following the statement head.
#[derive(Debug, Clone, PartialEq)]
pub enum Addition {
    Where(Condition),
    GroupBy {
        columns: Columns,
        having: Condition,
    },
    OrderBy(Vec<Order>),
    Limit {
        limit: u64,
        offset: u64,
    },
    OnConflict(OnConflict),
    Returning(Columns),
    Comment(String),
}

impl Addition {
    const fn rank(&self) -> u8 {
        match self {
            Self::Where(_) => 0,
            Self::GroupBy { .. } => 1,
            Self::OrderBy(_) => 2,
            Self::Limit { .. } => 3,
            Self::OnConflict(_) => 4,
            Self::Returning(_) => 5,
            Self::Comment(_) => 6,
        }
    }
}

/// `WHERE cond`. A nil condition adds nothing.
#[must_use]
pub fn where_clause(condition: impl Into<Condition>) -> Addition {
    Addition::Where(condition.into())
}

/// `GROUP BY cols`, optionally followed by [`Addition::having`].
#[must_use]
pub fn group_by(columns: Columns) -> Addition {
    Addition::GroupBy {
        columns,
        having: Condition::nil(),
    }
}

/// `ORDER BY ...`
#[must_use]
pub fn order_by(orders: impl IntoIterator<Item = Order>) -> Addition {
    Addition::OrderBy(orders.into_iter().collect())
}

/// `LIMIT n`, optionally followed by [`Addition::offset`].
#[must_use]
pub const fn limit(limit: u64) -> Addition {
    Addition::Limit { limit, offset: 0 }
}

impl Addition {
    /// Sets the `HAVING` condition of a `GROUP BY`. Other additions are
    /// returned unchanged.
    #[must_use]
    pub fn having(self, condition: impl Into<Condition>) -> Self {
        match self {
            Self::GroupBy { columns, having } => Self::GroupBy {
                columns,
                having: having.and(condition),
            },
            other => other,
        }
    }

    /// Sets the `OFFSET` of a `LIMIT`. Other additions are returned
    /// unchanged.
    #[must_use]
    pub fn offset(self, offset: u64) -> Self {
        match self {
            Self::Limit { limit, .. } => Self::Limit { limit, offset },
            other => other,
        }
    }
}

/// `/* text */` on its own line.
#[must_use]
pub fn comment(text: impl Into<String>) -> Addition {
    Addition::Comment(text.into())
}

/// `RETURNING cols`
#[must_use]
pub fn returning(columns: Columns) -> Addition {
    Addition::Returning(columns)
}

/// Starts an upsert on the conflict target `target`.
#[must_use]
pub fn on_conflict(target: Columns) -> OnConflictTarget {
    OnConflictTarget(target)
}

/// Conflict target awaiting its action.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflictTarget(Columns);

impl OnConflictTarget {
    /// Ignore conflicting rows.
    #[must_use]
    pub fn do_nothing(self) -> Addition {
        Addition::OnConflict(OnConflict {
            target: self.0,
            update: None,
        })
    }

    /// Update conflicting rows with `assignments`.
    #[must_use]
    pub fn do_update(self, assignments: impl Into<Assignments>) -> Addition {
        Addition::OnConflict(OnConflict {
            target: self.0,
            update: Some(assignments.into()),
        })
    }
}

/// Conflict handling of an `INSERT`.
///
/// Rendered by the active dialect. Without a dialect the
/// `ON CONFLICT (...) DO ...` form is used.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    pub target: Columns,
    /// `None` means do nothing.
    pub update: Option<Assignments>,
}

impl SqlExpr for OnConflict {
    fn ex(&self, ctx: &RenderContext<'_>) -> Ex {
        match ctx.dialect() {
            Some(dialect) => dialect.upsert_clause(self, ctx),
            None => on_conflict_clause(self, ctx),
        }
    }
}

/// The `ON CONFLICT (target) DO NOTHING | DO UPDATE SET ...` form.
#[must_use]
pub fn on_conflict_clause(conflict: &OnConflict, ctx: &RenderContext<'_>) -> Ex {
    let mut ex = Ex::new("ON CONFLICT ");
    ex.write_group(|ex| ex.write_str(&conflict.target.names().join(",")));
    match &conflict.update {
        Some(assignments) if !assignments.is_empty() => {
            ex.write_str(" DO UPDATE SET ");
            ex.write_expr(assignments, &ctx.with_toggles(ctx.toggles().with_use_values(false)));
        }
        _ => ex.write_str(" DO NOTHING"),
    }
    ex
}

/// Writes additions after a statement head, one clause per line.
pub(crate) fn write_additions(ex: &mut Ex, additions: &[Addition], ctx: &RenderContext<'_>) {
    let mut sorted: Vec<&Addition> = additions.iter().collect();
    sorted.sort_by_key(|addition| addition.rank());

    let mut conditions = Vec::new();
    let mut group_columns = Vec::new();
    let mut having = Vec::new();
    let mut orders = Vec::new();
    let mut limit_offset = None;
    let mut conflict = None;
    let mut returned = Vec::new();
    let mut comments = Vec::new();

    for addition in sorted {
        match addition {
            Addition::Where(condition) => conditions.push(condition.clone()),
            Addition::GroupBy { columns, having: h } => {
                group_columns.extend(columns.names().into_iter().map(String::from));
                having.push(h.clone());
            }
            Addition::OrderBy(items) => orders.extend(items.iter().cloned()),
            Addition::Limit { limit, offset } => limit_offset = Some((*limit, *offset)),
            Addition::OnConflict(c) => conflict = Some(c),
            Addition::Returning(columns) => {
                returned.extend(columns.names().into_iter().map(String::from));
            }
            Addition::Comment(text) => comments.push(text.as_str()),
        }
    }

    let condition = and(conditions);
    if !condition.is_nil() {
        ex.write_str("\nWHERE ");
        ex.write_expr(&condition, ctx);
    }
    if !group_columns.is_empty() {
        ex.write_str("\nGROUP BY ");
        ex.write_str(&group_columns.join(","));
        let having = and(having);
        if !having.is_nil() {
            ex.write_str(" HAVING ");
            ex.write_expr(&having, ctx);
        }
    }
    if !orders.is_empty() {
        ex.write_str("\nORDER BY ");
        for (i, order) in orders.iter().enumerate() {
            if i > 0 {
                ex.write_str(", ");
            }
            ex.write_expr(order, ctx);
        }
    }
    if let Some((limit, offset)) = limit_offset {
        ex.write_str(&format!("\nLIMIT {limit}"));
        if offset > 0 {
            ex.write_str(&format!(" OFFSET {offset}"));
        }
    }
    if let Some(conflict) = conflict {
        ex.write_char('\n');
        ex.write_expr(conflict, ctx);
    }
    if !returned.is_empty() {
        ex.write_str("\nRETURNING ");
        ex.write_str(&returned.join(","));
    }
    for text in comments {
        ex.write_str("\n/* ");
        ex.write_str(&text.replace("*/", "* /"));
        ex.write_str(" */");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::{col, cols};

    fn additions_sql(additions: &[Addition]) -> Ex {
        let mut ex = Ex::new("X");
        write_additions(&mut ex, additions, &RenderContext::new());
        ex
    }

    #[test]
    fn test_fixed_clause_order() {
        let ex = additions_sql(&[
            comment("c"),
            limit(10),
            order_by([col("a").asc()]),
            where_clause(col("a").eq(1)),
        ]);
        assert_eq!(ex.sql(), "X\nWHERE a = ?\nORDER BY a ASC\nLIMIT 10\n/* c */");
    }

    #[test]
    fn test_same_kind_merges() {
        let ex = additions_sql(&[
            where_clause(col("a").eq(1)),
            order_by([col("a").asc()]),
            where_clause(col("b").eq(2)),
            order_by([col("b").desc()]),
            limit(1),
            limit(5).offset(10),
        ]);
        assert_eq!(
            ex.sql(),
            "X\nWHERE (a = ?) AND (b = ?)\nORDER BY a ASC, b DESC\nLIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_nil_where_is_skipped() {
        let ex = additions_sql(&[where_clause(Condition::nil())]);
        assert_eq!(ex.sql(), "X");
    }

    #[test]
    fn test_group_by_having() {
        let ex = additions_sql(&[group_by(cols(["f_a"])).having(col("f_a").gt(1))]);
        assert_eq!(ex.sql(), "X\nGROUP BY f_a HAVING f_a > ?");
    }

    #[test]
    fn test_comment_cannot_close_early() {
        let ex = additions_sql(&[comment("a */ DROP")]);
        assert_eq!(ex.sql(), "X\n/* a * / DROP */");
    }

    #[test]
    fn test_neutral_on_conflict() {
        let ex = additions_sql(&[on_conflict(cols(["f_id"])).do_nothing()]);
        assert_eq!(ex.sql(), "X\nON CONFLICT (f_id) DO NOTHING");

        let ex = additions_sql(&[on_conflict(cols(["f_id"])).do_update(col("f_name").value_by("x"))]);
        assert_eq!(ex.sql(), "X\nON CONFLICT (f_id) DO UPDATE SET f_name = ?");
    }
}
