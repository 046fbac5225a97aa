//! # oxide-db-migrate
//!
//! Declarative migrations: the tables registered on a [`Db`](oxide_db::Db)
//! are compared with what the database reports, and the difference is
//! applied as DDL.
//!
//! - [`introspect`] reads live tables (MySQL `information_schema`,
//!   PostgreSQL `pg_catalog`)
//! - [`plan`] diffs every registered table against its live counterpart
//! - [`apply_plan`] runs a plan, with an optional progress sink and a dry
//!   run mode
//! - [`migrate`] does both
//!
//! DDL is not transactional on MySQL. A failing statement stops the run
//! but statements applied before it stay applied.
//!
//! ```no_run
//! use oxide_db::{Database, Db, DbConfig};
//! use oxide_db_migrate::{migrate, MigrateOptions};
//!
//! # async fn run() -> oxide_db_migrate::Result<()> {
//! let db = Db::connect(Database::new("app"), &DbConfig::new("mysql://root@localhost/app")).await?;
//! let mut out = std::io::stdout();
//! migrate(&db, MigrateOptions::new().progress(&mut out)).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod introspect;
pub mod migrate;
pub mod schema_file;

pub use error::{MigrateError, Result};
pub use introspect::introspect;
pub use migrate::{apply_plan, migrate, plan, MigrateOptions};
pub use schema_file::SchemaFile;
