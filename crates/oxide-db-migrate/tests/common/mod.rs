#![allow(dead_code)]

use oxide_db::{Database, Db, DbConfig};
use oxide_query::builder::Ex;
use oxide_query::migrations::{Operation, Plan};

/// An in-memory SQLite database rendered with the MySQL dialect.
///
/// One connection only: every connection to `:memory:` is its own database.
pub async fn sqlite_db(database: Database) -> Db {
    let config = DbConfig::new("sqlite::memory:")
        .with_dialect("mysql")
        .with_max_connections(1);
    Db::connect(database, &config).await.unwrap()
}

pub fn create_table(table: &str, sql: &str) -> (Operation, Ex) {
    (
        Operation::CreateTable {
            table: String::from(table),
        },
        Ex::new(sql),
    )
}

pub fn plan_of(steps: impl IntoIterator<Item = (Operation, Ex)>) -> Plan {
    let mut plan = Plan::new();
    for (operation, ex) in steps {
        plan.push(operation, ex);
    }
    plan
}

pub async fn table_exists(db: &Db, name: &str) -> bool {
    let found: i64 = db
        .query_scalar(&Ex::new(format!(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '{name}'"
        )))
        .await
        .unwrap();
    found > 0
}
