//! Reading live table definitions back from the database.
//!
//! Live columns carry their native type as [`DataType::Custom`], so the
//! dialect compares them after [`Dialect::normalize_type`]. Key names come
//! back lower-cased with the index method appended (`i_name/BTREE`).
//!
//! [`DataType::Custom`]: oxide_query::schema::DataType::Custom
//! [`Dialect::normalize_type`]: oxide_query::dialect::Dialect::normalize_type

mod mysql;
mod postgres;

use oxide_db::{Db, SqlError};
use oxide_query::schema::Table;
use tracing::debug;

/// The live definition of `table`, or `None` when it does not exist.
///
/// # Errors
///
/// Fails for dialects without introspection support, and on query errors.
pub async fn introspect(db: &Db, table: &Table) -> oxide_db::Result<Option<Table>> {
    debug!(table = %table.full_name(), dialect = db.dialect().name(), "Introspecting table");
    match db.dialect().name() {
        "mysql" => mysql::introspect(db, table).await,
        "postgres" => postgres::introspect(db, table).await,
        other => Err(SqlError::Config(format!(
            "no schema introspection for dialect `{other}`"
        ))),
    }
}
