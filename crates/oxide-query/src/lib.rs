//! # oxide-query
//!
//! Composable SQL expressions and schema migration.
//!
//! This crate provides:
//! - condition and statement builders rendering neutral SQL plus arguments
//! - table descriptions with the field tag and `@def` key grammars
//! - MySQL and PostgreSQL dialects
//! - a diff of live versus declared tables producing DDL plans
//!
//! ## Building statements
//!
//! ```rust
//! use oxide_query::builder::{col, limit, order_by, render, where_clause, Select};
//! use oxide_query::schema::{Column, DataType, Table};
//!
//! let table = Table::new("t_user")
//!     .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement").unwrap())
//!     .with_column(Column::from_tag("Name", DataType::String, "f_name,size=64").unwrap());
//!
//! let stmt = Select::new().from(
//!     &table,
//!     [
//!         where_clause(col("f_name").like("ali")),
//!         order_by([col("f_id").desc()]),
//!         limit(10),
//!     ],
//! );
//! let ex = render(&stmt);
//! assert_eq!(
//!     ex.sql(),
//!     "SELECT f_id,f_name FROM t_user\nWHERE f_name LIKE ?\nORDER BY f_id DESC\nLIMIT 10"
//! );
//! ```
//!
//! ## Dialects
//!
//! Rendered SQL uses `?` placeholders. Pass it through
//! [`Dialect::finalize`](dialect::Dialect::finalize) before execution:
//!
//! ```rust
//! use oxide_query::builder::{col, RenderContext, SqlExpr};
//! use oxide_query::dialect::{Dialect, Postgres};
//!
//! let cond = col("a").eq(1).or(col("b").eq(2));
//! let ex = Postgres.finalize(cond.ex(&RenderContext::with_dialect(&Postgres)));
//! assert_eq!(ex.sql(), "(a = $1) OR (b = $2)");
//! ```

pub mod builder;
pub mod dialect;
pub mod error;
pub mod migrations;
pub mod schema;

pub use builder::{col, Condition, Delete, Ex, Insert, Select, SqlExpr, SqlValue, Update};
pub use dialect::Dialect;
pub use error::{BuildError, Result};
pub use schema::{Column, Model, Table};
