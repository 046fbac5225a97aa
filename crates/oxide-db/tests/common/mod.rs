#![allow(dead_code)]

use oxide_db::{Database, Db, DbConfig};
use oxide_query::builder::Ex;
use oxide_query::schema::{Column, DataType, FieldValues, Keys, Model, Table};

#[derive(Debug, Clone, Default)]
pub struct Account {
    pub id: u64,
    pub email: String,
    pub credits: i64,
}

impl Account {
    pub fn new(email: &str, credits: i64) -> Self {
        Self {
            id: 0,
            email: String::from(email),
            credits,
        }
    }
}

impl Model for Account {
    fn table_name() -> &'static str {
        "t_account"
    }

    fn describe() -> oxide_query::Result<Table> {
        Ok(Table::new(Self::table_name())
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement")?)
            .with_column(Column::from_tag("Email", DataType::String, "f_email,size=128")?)
            .with_column(Column::from_tag(
                "Credits",
                DataType::Int64,
                "f_credits,default='0'",
            )?)
            .with_keys(Keys::from_defs([
                "@def primary ID",
                "@def unique_index I_email Email",
            ])?))
    }

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("ID", self.id)
            .with("Email", self.email.as_str())
            .with("Credits", self.credits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AccountRow {
    pub f_id: i64,
    pub f_email: String,
    pub f_credits: i64,
}

/// A fresh in-memory SQLite database with `t_account` created.
///
/// One connection only: every connection to `:memory:` is its own database.
pub async fn sqlite_db() -> Db {
    let mut database = Database::new("test");
    database.register::<Account>().unwrap();
    let config = DbConfig::new("sqlite::memory:")
        .with_dialect("mysql")
        .with_max_connections(1);
    let db = Db::connect(database, &config).await.unwrap();
    db.exec(&Ex::new(
        "CREATE TABLE t_account (\
         f_id INTEGER PRIMARY KEY AUTOINCREMENT, \
         f_email TEXT NOT NULL, \
         f_credits INTEGER NOT NULL DEFAULT 0)",
    ))
    .await
    .unwrap();
    db.exec(&Ex::new("CREATE UNIQUE INDEX i_email ON t_account (f_email)"))
        .await
        .unwrap();
    db
}

pub fn accounts(db: &Db) -> &Table {
    db.database().table_of::<Account>().unwrap()
}

pub async fn count(db: &Db) -> i64 {
    db.query_scalar(&Ex::new("SELECT COUNT(*) FROM t_account"))
        .await
        .unwrap()
}
