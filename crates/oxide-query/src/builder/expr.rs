//! Column predicates and small expression helpers.

use super::condition::Condition;
use super::ex::{Ex, RenderContext, SqlExpr};
use super::value::{SqlValue, ToSqlValue};
use crate::schema::{Column, ColumnType, Columns, DataType};

/// Creates a bare column reference. The name is lower-cased.
#[must_use]
pub fn col(name: &str) -> Column {
    Column::new(name, name, ColumnType::new(DataType::String))
}

/// Creates a list of bare column references.
#[must_use]
pub fn cols<'a>(names: impl IntoIterator<Item = &'a str>) -> Columns {
    names.into_iter().map(col).collect()
}

impl Column {
    /// `col = ?`
    #[must_use]
    pub fn eq<T: ToSqlValue>(&self, value: T) -> Condition {
        self.binary("=", value.to_sql_value())
    }

    /// `col <> ?`
    #[must_use]
    pub fn not_eq<T: ToSqlValue>(&self, value: T) -> Condition {
        self.binary("<>", value.to_sql_value())
    }

    /// `col < ?`
    #[must_use]
    pub fn lt<T: ToSqlValue>(&self, value: T) -> Condition {
        self.binary("<", value.to_sql_value())
    }

    /// `col <= ?`
    #[must_use]
    pub fn lt_eq<T: ToSqlValue>(&self, value: T) -> Condition {
        self.binary("<=", value.to_sql_value())
    }

    /// `col > ?`
    #[must_use]
    pub fn gt<T: ToSqlValue>(&self, value: T) -> Condition {
        self.binary(">", value.to_sql_value())
    }

    /// `col >= ?`
    #[must_use]
    pub fn gt_eq<T: ToSqlValue>(&self, value: T) -> Condition {
        self.binary(">=", value.to_sql_value())
    }

    /// `col LIKE ?` matching `%text%`.
    #[must_use]
    pub fn like(&self, text: &str) -> Condition {
        self.binary("LIKE", SqlValue::Text(format!("%{text}%")))
    }

    /// `col NOT LIKE ?` matching `%text%`.
    #[must_use]
    pub fn not_like(&self, text: &str) -> Condition {
        self.binary("NOT LIKE", SqlValue::Text(format!("%{text}%")))
    }

    /// `col LIKE ?` matching values ending with `text`.
    #[must_use]
    pub fn left_like(&self, text: &str) -> Condition {
        self.binary("LIKE", SqlValue::Text(format!("%{text}")))
    }

    /// `col LIKE ?` matching values starting with `text`.
    #[must_use]
    pub fn right_like(&self, text: &str) -> Condition {
        self.binary("LIKE", SqlValue::Text(format!("{text}%")))
    }

    /// `col BETWEEN ? AND ?`
    #[must_use]
    pub fn between<T: ToSqlValue, U: ToSqlValue>(&self, low: T, high: U) -> Condition {
        self.between_impl("BETWEEN", low.to_sql_value(), high.to_sql_value())
    }

    /// `col NOT BETWEEN ? AND ?`
    #[must_use]
    pub fn not_between<T: ToSqlValue, U: ToSqlValue>(&self, low: T, high: U) -> Condition {
        self.between_impl("NOT BETWEEN", low.to_sql_value(), high.to_sql_value())
    }

    /// `col IN (?,?)`. Nil without values.
    #[must_use]
    pub fn in_list<T: ToSqlValue>(&self, values: impl IntoIterator<Item = T>) -> Condition {
        self.in_list_impl("IN", values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// `col NOT IN (?,?)`. Nil without values.
    #[must_use]
    pub fn not_in_list<T: ToSqlValue>(&self, values: impl IntoIterator<Item = T>) -> Condition {
        self.in_list_impl("NOT IN", values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// `col IS NULL`
    #[must_use]
    pub fn is_null(&self) -> Condition {
        Condition::leaf(Ex::new(format!("{} IS NULL", self.name)))
    }

    /// `col IS NOT NULL`
    #[must_use]
    pub fn is_not_null(&self) -> Condition {
        Condition::leaf(Ex::new(format!("{} IS NOT NULL", self.name)))
    }

    /// Ascending sort on this column.
    #[must_use]
    pub fn asc(&self) -> Order {
        Order {
            column: self.name.clone(),
            direction: Direction::Asc,
        }
    }

    /// Descending sort on this column.
    #[must_use]
    pub fn desc(&self) -> Order {
        Order {
            column: self.name.clone(),
            direction: Direction::Desc,
        }
    }

    fn binary(&self, op: &str, value: SqlValue) -> Condition {
        let mut ex = Ex::new(format!("{} {op} ", self.name));
        ex.write_arg(value);
        Condition::leaf(ex)
    }

    fn between_impl(&self, keyword: &str, low: SqlValue, high: SqlValue) -> Condition {
        let mut ex = Ex::new(format!("{} {keyword} ", self.name));
        ex.write_arg(low);
        ex.write_str(" AND ");
        ex.write_arg(high);
        Condition::leaf(ex)
    }

    fn in_list_impl(&self, keyword: &str, values: Vec<SqlValue>) -> Condition {
        if values.is_empty() {
            return Condition::nil();
        }
        let mut ex = Ex::new(format!("{} {keyword} ", self.name));
        ex.write_group(|ex| ex.write_args(values));
        Condition::leaf(ex)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    column: String,
    direction: Direction,
}

impl SqlExpr for Order {
    fn ex(&self, _ctx: &RenderContext<'_>) -> Ex {
        let direction = match self.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        Ex::new(format!("{} {direction}", self.column))
    }
}

/// `COUNT(*)`
#[must_use]
pub fn count() -> Ex {
    Ex::new("COUNT(*)")
}

/// `COUNT(col)`
#[must_use]
pub fn count_of(column: &Column) -> Ex {
    Ex::new(format!("COUNT({})", column.name))
}
