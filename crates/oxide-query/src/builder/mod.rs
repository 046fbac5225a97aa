//! Composable SQL builder.
//!
//! Statements are trees of [`SqlExpr`] nodes rendered into an [`Ex`]: SQL
//! text with neutral `?` placeholders and the matching argument list.
//!
//! # Example
//!
//! ```rust
//! use oxide_query::builder::{col, comment, render, where_clause, Delete};
//! use oxide_query::schema::Table;
//!
//! let stmt = Delete::new().from(
//!     &Table::new("T"),
//!     [comment("Comment"), where_clause(col("f_a").eq(1))],
//! );
//!
//! assert_eq!(render(&stmt).sql(), "DELETE FROM T\nWHERE f_a = ?\n/* Comment */");
//! ```

mod addition;
mod assignment;
mod condition;
mod delete;
pub mod ex;
mod expr;
mod insert;
mod select;
mod update;
pub mod value;

pub use addition::{
    comment, group_by, limit, on_conflict, on_conflict_clause, order_by, returning, where_clause,
    Addition, OnConflict, OnConflictTarget,
};
pub use assignment::{columns_and_values, Assignment, Assignments};
pub use condition::{and, or, xor, Condition, Logic};
pub use delete::{Delete, StmtDelete};
pub use ex::{render, Ex, RenderContext, SqlExpr, Toggles};
pub use expr::{col, cols, count, count_of, Direction, Order};
pub use insert::{Insert, InsertInto, StmtInsert};
pub use select::{Select, StmtSelect};
pub use update::Update;
pub use value::{SqlValue, ToSqlValue};
