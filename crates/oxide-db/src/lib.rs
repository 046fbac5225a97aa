//! # oxide-db
//!
//! Runs [`oxide_query`] statements through `sqlx`.
//!
//! - [`Database`]: the registry of tables described by models
//! - [`Db`]: a database bound to a dialect, a pool and a [`Context`]
//! - [`Tx`] and [`Tasks`]: transactions and transactional step lists
//! - [`SqlError`]: classified execution errors
//!
//! ```no_run
//! use oxide_db::{Database, Db, DbConfig};
//! use oxide_query::builder::{col, where_clause, Select};
//! use oxide_query::schema::Table;
//!
//! # async fn run() -> oxide_db::Result<()> {
//! let db = Db::connect(Database::feature("app"), &DbConfig::new("mysql://root@localhost/app")).await?;
//! let table = Table::new("t_user");
//! let stmt = Select::new().from(&table, [where_clause(col("f_id").eq(1))]);
//! let count: i64 = db.query_scalar(&stmt).await?;
//! # let _ = count;
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod database;
mod db;
mod error;
mod exec;
mod tasks;
mod tx;

pub use config::DbConfig;
pub use context::Context;
pub use database::{Database, PROJECT_FEATURE_ENV};
pub use db::Db;
pub use error::{Result, SqlError};
pub use exec::ExecResult;
pub use tasks::Tasks;
pub use tx::Tx;
