#![allow(dead_code)]

use oxide_query::builder::{render, SqlExpr, SqlValue};
use oxide_query::schema::{Column, DataType, FieldValues, Keys, Model, Table};
use oxide_query::Result;

/// Asserts the neutral rendering of `expr`.
pub fn assert_ex(expr: &dyn SqlExpr, sql: &str, args: &[SqlValue]) {
    let ex = render(expr);
    assert_eq!(ex.sql(), sql, "unexpected SQL");
    assert_eq!(ex.args(), args, "unexpected arguments for: {sql}");
}

pub fn int(v: i64) -> SqlValue {
    SqlValue::Int(v)
}

pub fn text(v: &str) -> SqlValue {
    SqlValue::Text(String::from(v))
}

#[derive(Debug, Clone, Default)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub nickname: String,
    pub username: String,
    pub gender: i32,
}

impl Model for User {
    fn table_name() -> &'static str {
        "t_user"
    }

    fn describe() -> Result<Table> {
        Ok(Table::new(Self::table_name())
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement")?)
            .with_column(
                Column::from_tag("Name", DataType::String, "f_name,size=255,default=''")?
                    .describe("real name"),
            )
            .with_column(Column::from_tag(
                "Nickname",
                DataType::String,
                "f_nickname,size=255,default=''",
            )?)
            .with_column(Column::from_tag("Username", DataType::String, "f_username,default=''")?)
            .with_column(Column::from_tag("Gender", DataType::Int32, "f_gender,default='0'")?)
            .with_keys(Keys::from_defs([
                "@def primary ID",
                "@def index I_nickname Nickname",
                "@def unique_index I_name Name",
            ])?)
            .bind_model("User"))
    }

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("ID", self.id)
            .with("Name", self.name.as_str())
            .with("Nickname", self.nickname.as_str())
            .with("Username", self.username.as_str())
            .with("Gender", self.gender)
    }
}

/// The next version of [`User`]: `Name` renamed to `RealName`, `Age`
/// added, `Username` dropped, and the nickname index made unique.
#[derive(Debug, Clone, Default)]
pub struct User2 {
    pub id: u64,
    pub nickname: String,
    pub gender: i32,
    pub real_name: String,
    pub age: i32,
}

impl Model for User2 {
    fn table_name() -> &'static str {
        "t_user"
    }

    fn describe() -> Result<Table> {
        Ok(Table::new(Self::table_name())
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement")?)
            .with_column(Column::from_tag(
                "Nickname",
                DataType::String,
                "f_nickname,size=255,default=''",
            )?)
            .with_column(Column::from_tag("Gender", DataType::Int32, "f_gender,default='0'")?)
            .with_column(Column::from_tag(
                "Name",
                DataType::String,
                "f_name,size=255,default='',deprecated=f_real_name",
            )?)
            .with_column(Column::from_tag(
                "RealName",
                DataType::String,
                "f_real_name,size=255,default=''",
            )?)
            .with_column(Column::from_tag("Age", DataType::Int32, "f_age,default='0'")?)
            .with_column(Column::from_tag(
                "Username",
                DataType::String,
                "f_username,default='',deprecated",
            )?)
            .with_keys(Keys::from_defs([
                "@def primary ID",
                "@def unique_index I_nickname Nickname",
            ])?)
            .bind_model("User2"))
    }

    fn field_values(&self) -> FieldValues {
        FieldValues::new()
            .with("ID", self.id)
            .with("Nickname", self.nickname.as_str())
            .with("Gender", self.gender)
            .with("RealName", self.real_name.as_str())
            .with("Age", self.age)
    }
}
