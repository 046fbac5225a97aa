//! MySQL and MariaDB.

use std::sync::OnceLock;

use regex::Regex;

use super::{key_column_list, quote_literal, Dialect};
use crate::builder::ex::{Ex, RenderContext, SqlExpr};
use crate::builder::OnConflict;
use crate::schema::{Column, ColumnType, DataType, Key, KeyKind, Table};

/// MySQL dialect: backtick quoting, `?` placeholders, inline keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl MySql {
    /// Index kinds declared through the method suffix.
    fn index_prefix(method: Option<&str>) -> Option<&'static str> {
        match method {
            Some("SPATIAL") => Some("SPATIAL"),
            Some("FULLTEXT") => Some("FULLTEXT"),
            _ => None,
        }
    }

    fn key_definition(table: &Table, key: &Key) -> String {
        let columns = key_column_list(table, key);
        match key.kind {
            KeyKind::Primary => format!("PRIMARY KEY {columns}"),
            KeyKind::UniqueIndex => format!("UNIQUE INDEX {} {columns}", key.name),
            KeyKind::Index => match (Self::index_prefix(key.method.as_deref()), key.method.as_deref()) {
                (Some(prefix), _) => format!("{prefix} INDEX {} {columns}", key.name),
                (None, Some(method @ ("BTREE" | "HASH"))) => {
                    format!("INDEX {} USING {method} {columns}", key.name)
                }
                _ => format!("INDEX {} {columns}", key.name),
            },
        }
    }
}

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn placeholder(&self, _index: usize) -> String {
        String::from("?")
    }

    fn data_type(&self, column_type: &ColumnType) -> String {
        let length = column_type.length;
        let unsigned = if column_type.data_type.is_unsigned() {
            " unsigned"
        } else {
            ""
        };
        match &column_type.data_type {
            DataType::Bool => String::from("boolean"),
            DataType::Int8 | DataType::UInt8 => format!("tinyint{unsigned}"),
            DataType::Int16 | DataType::UInt16 => format!("smallint{unsigned}"),
            DataType::Int32 | DataType::UInt32 => format!("int{unsigned}"),
            DataType::Int64 | DataType::UInt64 => format!("bigint{unsigned}"),
            DataType::Float32 if length > 0 => format!("float({length},{})", column_type.decimal),
            DataType::Float32 => String::from("float"),
            DataType::Float64 if length > 0 => format!("double({length},{})", column_type.decimal),
            DataType::Float64 => String::from("double"),
            DataType::String => match length {
                0 => String::from("varchar(255)"),
                1..=16383 => format!("varchar({length})"),
                16384..=65535 => String::from("text"),
                65536..=16_777_215 => String::from("mediumtext"),
                _ => String::from("longtext"),
            },
            DataType::Bytes => match length {
                0..=65535 => String::from("blob"),
                65536..=16_777_215 => String::from("mediumblob"),
                _ => String::from("longblob"),
            },
            DataType::Timestamp => String::from("datetime"),
            DataType::Date => String::from("date"),
            DataType::Json => String::from("json"),
            DataType::Custom(custom) => String::from(custom.for_dialect(self.name())),
        }
    }

    fn normalize_type(&self, native: &str) -> String {
        static INT_WIDTH: OnceLock<Regex> = OnceLock::new();
        let re = INT_WIDTH.get_or_init(|| {
            Regex::new(r"^(tinyint|smallint|mediumint|int|bigint)\(\d+\)")
                .expect("int width regex is valid")
        });

        let native = native.trim().to_lowercase();
        match native.as_str() {
            "bool" | "boolean" | "tinyint(1)" => return String::from("tinyint(1)"),
            "integer" => return String::from("int"),
            _ => {}
        }
        re.replace(&native, "$1").into_owned()
    }

    fn column_definition(&self, column: &Column) -> String {
        let ct = &column.column_type;
        let mut def = format!("{} {}", column.name, self.data_type(ct));
        if !ct.null {
            def.push_str(" NOT NULL");
        }
        if ct.auto_increment {
            def.push_str(" AUTO_INCREMENT");
        }
        if let Some(default) = &ct.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        if let Some(on_update) = &ct.on_update {
            def.push_str(" ON UPDATE ");
            def.push_str(on_update);
        }
        if !column.description.is_empty() {
            def.push_str(" COMMENT ");
            def.push_str(&quote_literal(&column.description.join(" ")));
        }
        def
    }

    fn create_table(&self, table: &Table) -> Vec<Ex> {
        let mut lines: Vec<String> = table
            .active_columns()
            .iter()
            .map(|column| self.column_definition(column))
            .collect();
        lines.extend(
            table
                .keys
                .all()
                .iter()
                .map(|key| Self::key_definition(table, key)),
        );

        let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n\t", table.full_name());
        sql.push_str(&lines.join(",\n\t"));
        sql.push_str("\n) ENGINE=InnoDB CHARSET=utf8mb4");
        if !table.description.is_empty() {
            sql.push_str(" COMMENT=");
            sql.push_str(&quote_literal(&table.description.join(" ")));
        }
        vec![Ex::new(sql)]
    }

    fn modify_column(&self, table: &Table, column: &Column, _previous: &Column) -> Ex {
        Ex::new(format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            table.full_name(),
            self.column_definition(column)
        ))
    }

    fn add_index(&self, table: &Table, key: &Key) -> Ex {
        let name = table.full_name();
        let columns = key_column_list(table, key);
        let sql = match key.kind {
            KeyKind::Primary => format!("ALTER TABLE {name} ADD PRIMARY KEY {columns}"),
            KeyKind::UniqueIndex => {
                format!("CREATE UNIQUE INDEX {} ON {name} {columns}", key.name)
            }
            KeyKind::Index => match (Self::index_prefix(key.method.as_deref()), key.method.as_deref()) {
                (Some(prefix), _) => {
                    format!("CREATE {prefix} INDEX {} ON {name} {columns}", key.name)
                }
                (None, Some(method @ ("BTREE" | "HASH"))) => {
                    format!("CREATE INDEX {} USING {method} ON {name} {columns}", key.name)
                }
                _ => format!("CREATE INDEX {} ON {name} {columns}", key.name),
            },
        };
        Ex::new(sql)
    }

    fn drop_index(&self, table: &Table, key: &Key) -> Ex {
        if key.is_primary() {
            return Ex::new(format!("ALTER TABLE {} DROP PRIMARY KEY", table.full_name()));
        }
        Ex::new(format!("DROP INDEX {} ON {}", key.name, table.full_name()))
    }

    fn create_database(&self, name: &str) -> Ex {
        Ex::new(format!("CREATE DATABASE IF NOT EXISTS {}", self.quote(name)))
    }

    fn create_schema(&self, _name: &str) -> Ex {
        Ex::default()
    }

    fn upsert_clause(&self, conflict: &OnConflict, ctx: &RenderContext<'_>) -> Ex {
        let mut ex = Ex::new("ON DUPLICATE KEY UPDATE ");
        match &conflict.update {
            Some(assignments) if !assignments.is_empty() => {
                let pairs = ctx.with_toggles(ctx.toggles().with_use_values(false));
                ex.append(assignments.ex(&pairs));
            }
            _ => {
                // No-op assignment on the first target column.
                let target = conflict.target.names();
                let column = target.first().copied().unwrap_or("id");
                ex.write_str(&format!("{column} = {column}"));
            }
        }
        ex
    }

    fn conflict_code(&self) -> &'static str {
        "1062"
    }

    fn index_method(&self, method: Option<&str>) -> Option<String> {
        match method?.to_uppercase().as_str() {
            m @ ("BTREE" | "HASH" | "SPATIAL" | "FULLTEXT") => Some(String::from(m)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{col, cols, on_conflict, render, Addition};
    use crate::schema::Keys;

    fn user() -> Table {
        Table::new("t_user")
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement").unwrap())
            .with_column(Column::from_tag("Name", DataType::String, "f_name,default=''").unwrap())
            .with_column(
                Column::from_tag("Nickname", DataType::String, "f_nickname,size=32,null")
                    .unwrap()
                    .describe("display name"),
            )
            .with_keys(
                Keys::default()
                    .with_primary(["ID"])
                    .with_unique_index("I_name", ["Name"])
                    .with_index("I_nickname/BTREE", ["Nickname"]),
            )
    }

    #[test]
    fn test_data_types() {
        let mysql = MySql;
        let ty = |dt| mysql.data_type(&ColumnType::new(dt));
        assert_eq!(ty(DataType::Bool), "boolean");
        assert_eq!(ty(DataType::UInt64), "bigint unsigned");
        assert_eq!(ty(DataType::Int32), "int");
        assert_eq!(ty(DataType::String), "varchar(255)");
        assert_eq!(mysql.data_type(&ColumnType::new(DataType::String).with_length(70000)), "mediumtext");
        assert_eq!(ty(DataType::Timestamp), "datetime");
    }

    #[test]
    fn test_create_table() {
        let statements = MySql.create_table(&user());
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].sql(),
            "CREATE TABLE IF NOT EXISTS t_user (\n\
             \tf_id bigint unsigned NOT NULL AUTO_INCREMENT,\n\
             \tf_name varchar(255) NOT NULL DEFAULT '',\n\
             \tf_nickname varchar(32) COMMENT 'display name',\n\
             \tPRIMARY KEY (f_id),\n\
             \tUNIQUE INDEX i_name (f_name),\n\
             \tINDEX i_nickname USING BTREE (f_nickname)\n\
             ) ENGINE=InnoDB CHARSET=utf8mb4"
        );
    }

    #[test]
    fn test_index_ddl() {
        let table = user();
        let keys = table.keys.all();
        assert_eq!(MySql.add_index(&table, &keys[0]).sql(), "ALTER TABLE t_user ADD PRIMARY KEY (f_id)");
        assert_eq!(MySql.add_index(&table, &keys[1]).sql(), "CREATE UNIQUE INDEX i_name ON t_user (f_name)");
        assert_eq!(
            MySql.add_index(&table, &keys[2]).sql(),
            "CREATE INDEX i_nickname USING BTREE ON t_user (f_nickname)"
        );
        assert_eq!(MySql.drop_index(&table, &keys[0]).sql(), "ALTER TABLE t_user DROP PRIMARY KEY");
        assert_eq!(MySql.drop_index(&table, &keys[1]).sql(), "DROP INDEX i_name ON t_user");
    }

    #[test]
    fn test_spatial_index() {
        let table = Table::new("t_geo")
            .with_column(Column::from_tag("Geom", DataType::Bytes, "f_geom").unwrap())
            .with_keys(Keys::default().with_index("I_geom/SPATIAL", ["Geom"]));
        let key = &table.keys.all()[0];
        assert_eq!(MySql.add_index(&table, key).sql(), "CREATE SPATIAL INDEX i_geom ON t_geo (f_geom)");
    }

    #[test]
    fn test_column_ddl() {
        let table = user();
        let name = table.col("f_name").unwrap();
        assert_eq!(
            MySql.add_column(&table, name).sql(),
            "ALTER TABLE t_user ADD COLUMN f_name varchar(255) NOT NULL DEFAULT ''"
        );
        assert_eq!(
            MySql.modify_column(&table, name, name).sql(),
            "ALTER TABLE t_user MODIFY COLUMN f_name varchar(255) NOT NULL DEFAULT ''"
        );
        assert_eq!(
            MySql.rename_column(&table, "f_old", "f_new").sql(),
            "ALTER TABLE t_user RENAME COLUMN f_old TO f_new"
        );
        assert_eq!(MySql.drop_column(&table, "f_old").sql(), "ALTER TABLE t_user DROP COLUMN f_old");
    }

    #[test]
    fn test_database_ddl() {
        assert_eq!(MySql.create_database("app").sql(), "CREATE DATABASE IF NOT EXISTS `app`");
        assert_eq!(MySql.drop_database("app").sql(), "DROP DATABASE IF EXISTS `app`");
        assert!(MySql.drop_database("").is_nil());
        assert!(MySql.create_schema("app").is_nil());
        assert!(MySql.drop_table(&Table::new("")).is_nil());
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(MySql.normalize_type("bigint(20) unsigned"), "bigint unsigned");
        assert_eq!(MySql.normalize_type("BOOLEAN"), "tinyint(1)");
        assert_eq!(MySql.normalize_type("tinyint(1)"), "tinyint(1)");
        assert_eq!(MySql.normalize_type("varchar(255)"), "varchar(255)");
    }

    #[test]
    fn test_upsert() {
        let ctx = RenderContext::with_dialect(&MySql);
        let Addition::OnConflict(nothing) = on_conflict(cols(["f_id"])).do_nothing() else {
            unreachable!()
        };
        assert_eq!(nothing.ex(&ctx).sql(), "ON DUPLICATE KEY UPDATE f_id = f_id");

        let Addition::OnConflict(update) = on_conflict(cols(["f_id"])).do_update(col("f_name").value_by("x")) else {
            unreachable!()
        };
        let ex = update.ex(&ctx);
        assert_eq!(ex.sql(), "ON DUPLICATE KEY UPDATE f_name = ?");
        assert_eq!(ex.args().len(), 1);
        assert_eq!(render(&update).sql(), "ON CONFLICT (f_id) DO UPDATE SET f_name = ?");
    }
}
