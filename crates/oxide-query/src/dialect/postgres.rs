//! PostgreSQL.

use super::{key_column_list, normalize_default, quote_literal, rewrite_placeholders, Dialect};
use crate::builder::ex::{Ex, RenderContext};
use crate::builder::value::SqlValue;
use crate::builder::{on_conflict_clause, OnConflict};
use crate::schema::{Column, ColumnType, DataType, Key, KeyKind, Table};

/// PostgreSQL dialect: double-quote quoting, `$n` placeholders, indexes as
/// separate statements named `{table}_{key}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Postgres {
    fn index_name(table: &Table, key: &Key) -> String {
        format!("{}_{}", table.name, key.name)
    }

    fn qualified(table: &Table, name: &str) -> String {
        match &table.schema {
            Some(schema) => format!("{schema}.{name}"),
            None => String::from(name),
        }
    }

    fn serial(data_type: &str) -> &'static str {
        match data_type {
            "smallint" => "smallserial",
            "integer" => "serial",
            _ => "bigserial",
        }
    }
}

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    /// Parameters are typed on PostgreSQL. `NULL` is written inline so the
    /// server infers its type from the column, and timestamps, sent as
    /// text, are cast to `timestamp`.
    fn finalize(&self, ex: Ex) -> Ex {
        let (sql, args) = ex.into_parts();
        let mut bound = Vec::with_capacity(args.len());
        let sql = rewrite_placeholders(&sql, |i| match args.get(i - 1) {
            Some(SqlValue::Null) => String::from("NULL"),
            Some(value) => {
                bound.push(value.clone());
                let placeholder = self.placeholder(bound.len());
                if matches!(value, SqlValue::Timestamp(_)) {
                    format!("{placeholder}::timestamp")
                } else {
                    placeholder
                }
            }
            None => self.placeholder(bound.len() + 1),
        });
        Ex::with_args(sql, bound)
    }

    fn data_type(&self, column_type: &ColumnType) -> String {
        let length = column_type.length;
        match &column_type.data_type {
            DataType::Bool => String::from("boolean"),
            DataType::Int8 | DataType::UInt8 | DataType::Int16 => String::from("smallint"),
            DataType::UInt16 | DataType::Int32 => String::from("integer"),
            DataType::UInt32 | DataType::Int64 | DataType::UInt64 => String::from("bigint"),
            DataType::Float32 | DataType::Float64 if length > 0 => {
                format!("numeric({length},{})", column_type.decimal)
            }
            DataType::Float32 => String::from("real"),
            DataType::Float64 => String::from("double precision"),
            DataType::String => match length {
                0 => String::from("varchar(255)"),
                1..=65535 => format!("varchar({length})"),
                _ => String::from("text"),
            },
            DataType::Bytes => String::from("bytea"),
            DataType::Timestamp => String::from("timestamp"),
            DataType::Date => String::from("date"),
            DataType::Json => String::from("jsonb"),
            DataType::Custom(custom) => String::from(custom.for_dialect(self.name())),
        }
    }

    fn normalize_type(&self, native: &str) -> String {
        let native = native.trim().to_lowercase();
        if let Some(rest) = native.strip_prefix("character varying") {
            return format!("varchar{rest}");
        }
        if let Some(rest) = native.strip_prefix("timestamp") {
            if rest.trim() == "without time zone" {
                return String::from("timestamp");
            }
        }
        match native.as_str() {
            "bool" => String::from("boolean"),
            "int2" => String::from("smallint"),
            "int" | "int4" => String::from("integer"),
            "int8" => String::from("bigint"),
            "float4" => String::from("real"),
            "float8" => String::from("double precision"),
            "timestamp with time zone" => String::from("timestamptz"),
            _ => native,
        }
    }

    fn column_definition(&self, column: &Column) -> String {
        let ct = &column.column_type;
        let data_type = self.data_type(ct);
        let mut def = if ct.auto_increment {
            format!("{} {}", column.name, Self::serial(&data_type))
        } else {
            format!("{} {data_type}", column.name)
        };
        if !ct.null {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = &ct.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        def
    }

    fn create_table(&self, table: &Table) -> Vec<Ex> {
        let keys = table.keys.all();
        let mut lines: Vec<String> = table
            .active_columns()
            .iter()
            .map(|column| self.column_definition(column))
            .collect();
        if let Some(primary) = keys.iter().find(|key| key.is_primary()) {
            lines.push(format!("PRIMARY KEY {}", key_column_list(table, primary)));
        }

        let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n\t", table.full_name());
        sql.push_str(&lines.join(",\n\t"));
        sql.push_str("\n)");

        let mut statements = vec![Ex::new(sql)];
        statements.extend(
            keys.iter()
                .filter(|key| !key.is_primary())
                .map(|key| self.add_index(table, key)),
        );
        if !table.description.is_empty() {
            statements.push(Ex::new(format!(
                "COMMENT ON TABLE {} IS {}",
                table.full_name(),
                quote_literal(&table.description.join(" "))
            )));
        }
        for column in &table.active_columns() {
            if !column.description.is_empty() {
                statements.push(Ex::new(format!(
                    "COMMENT ON COLUMN {}.{} IS {}",
                    table.full_name(),
                    column.name,
                    quote_literal(&column.description.join(" "))
                )));
            }
        }
        statements
    }

    fn modify_column(&self, table: &Table, column: &Column, previous: &Column) -> Ex {
        let desired = &column.column_type;
        let live = &previous.column_type;
        let name = &column.name;
        let mut actions = Vec::new();

        let data_type = self.data_type(desired);
        if self.normalize_type(&self.data_type(live)) != self.normalize_type(&data_type) {
            actions.push(format!("ALTER COLUMN {name} TYPE {data_type} USING {name}::{data_type}"));
        }
        if live.null != desired.null {
            let verb = if desired.null { "DROP" } else { "SET" };
            actions.push(format!("ALTER COLUMN {name} {verb} NOT NULL"));
        }
        if normalize_default(live.default.as_deref()) != normalize_default(desired.default.as_deref()) {
            match &desired.default {
                Some(default) => actions.push(format!("ALTER COLUMN {name} SET DEFAULT {default}")),
                None => actions.push(format!("ALTER COLUMN {name} DROP DEFAULT")),
            }
        }

        if actions.is_empty() {
            return Ex::default();
        }
        Ex::new(format!(
            "ALTER TABLE {} {}",
            table.full_name(),
            actions.join(", ")
        ))
    }

    fn add_index(&self, table: &Table, key: &Key) -> Ex {
        let columns = key_column_list(table, key);
        if key.is_primary() {
            return Ex::new(format!(
                "ALTER TABLE {} ADD PRIMARY KEY {columns}",
                table.full_name()
            ));
        }
        let unique = if key.kind == KeyKind::UniqueIndex {
            "UNIQUE "
        } else {
            ""
        };
        let method = self
            .index_method(key.method.as_deref())
            .map(|m| format!(" USING {m}"))
            .unwrap_or_default();
        Ex::new(format!(
            "CREATE {unique}INDEX IF NOT EXISTS {} ON {}{method} {columns}",
            Self::index_name(table, key),
            table.full_name()
        ))
    }

    fn drop_index(&self, table: &Table, key: &Key) -> Ex {
        if key.is_primary() {
            return Ex::new(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}_pkey",
                table.full_name(),
                table.name
            ));
        }
        Ex::new(format!(
            "DROP INDEX IF EXISTS {}",
            Self::qualified(table, &Self::index_name(table, key))
        ))
    }

    fn create_database(&self, name: &str) -> Ex {
        Ex::new(format!("CREATE DATABASE {}", self.quote(name)))
    }

    fn create_schema(&self, name: &str) -> Ex {
        if name.is_empty() {
            return Ex::default();
        }
        Ex::new(format!("CREATE SCHEMA IF NOT EXISTS {name}"))
    }

    fn upsert_clause(&self, conflict: &OnConflict, ctx: &RenderContext<'_>) -> Ex {
        on_conflict_clause(conflict, ctx)
    }

    fn conflict_code(&self) -> &'static str {
        "23505"
    }

    fn index_method(&self, method: Option<&str>) -> Option<String> {
        match method?.to_uppercase().as_str() {
            "SPATIAL" | "GIST" => Some(String::from("gist")),
            m @ ("BTREE" | "HASH" | "GIN" | "BRIN" | "SPGIST") => Some(m.to_lowercase()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ex::SqlExpr;
    use crate::schema::Keys;

    fn user() -> Table {
        Table::new("t_user")
            .with_schema("app")
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement").unwrap())
            .with_column(Column::from_tag("Name", DataType::String, "f_name,default=''").unwrap())
            .with_column(Column::from_tag("Geom", DataType::Bytes, "f_geom,null").unwrap())
            .with_keys(
                Keys::default()
                    .with_primary(["ID"])
                    .with_unique_index("I_name", ["Name"])
                    .with_index("I_geom/SPATIAL", ["Geom"]),
            )
    }

    #[test]
    fn test_finalize_inlines_null_and_casts_timestamps() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let ex = Ex::with_args(
            "UPDATE t SET a = ?, b = ?, c = ? WHERE d = '?' AND e = ?",
            vec![
                SqlValue::Int(1),
                SqlValue::Null,
                SqlValue::Timestamp(at),
                SqlValue::from("x"),
            ],
        );

        let ex = Postgres.finalize(ex);

        assert_eq!(
            ex.sql(),
            "UPDATE t SET a = $1, b = NULL, c = $2::timestamp WHERE d = '?' AND e = $3"
        );
        assert_eq!(
            ex.args(),
            &[SqlValue::Int(1), SqlValue::Timestamp(at), SqlValue::from("x")]
        );
    }

    #[test]
    fn test_create_table_with_separate_indexes() {
        let statements: Vec<String> = Postgres
            .create_table(&user())
            .into_iter()
            .map(|ex| String::from(ex.sql()))
            .collect();
        assert_eq!(
            statements,
            vec![
                String::from(
                    "CREATE TABLE IF NOT EXISTS app.t_user (\n\
                     \tf_id bigserial NOT NULL,\n\
                     \tf_name varchar(255) NOT NULL DEFAULT '',\n\
                     \tf_geom bytea,\n\
                     \tPRIMARY KEY (f_id)\n\
                     )"
                ),
                String::from("CREATE INDEX IF NOT EXISTS t_user_i_geom ON app.t_user USING gist (f_geom)"),
                String::from("CREATE UNIQUE INDEX IF NOT EXISTS t_user_i_name ON app.t_user (f_name)"),
            ]
        );
    }

    #[test]
    fn test_drop_keys() {
        let table = user();
        let keys = table.keys.all();
        assert_eq!(
            Postgres.drop_index(&table, &keys[0]).sql(),
            "ALTER TABLE app.t_user DROP CONSTRAINT t_user_pkey"
        );
        assert_eq!(
            Postgres.drop_index(&table, &keys[2]).sql(),
            "DROP INDEX IF EXISTS app.t_user_i_name"
        );
    }

    #[test]
    fn test_modify_column_actions() {
        let table = user();
        let previous = Column::new("Name", "f_name", ColumnType::new(DataType::Int32).nullable(true));
        let desired = table.col("f_name").unwrap();
        assert_eq!(
            Postgres.modify_column(&table, desired, &previous).sql(),
            "ALTER TABLE app.t_user \
             ALTER COLUMN f_name TYPE varchar(255) USING f_name::varchar(255), \
             ALTER COLUMN f_name SET NOT NULL, \
             ALTER COLUMN f_name SET DEFAULT ''"
        );
    }

    #[test]
    fn test_modify_column_nothing_to_do_is_nil() {
        let table = user();
        let column = table.col("f_name").unwrap();
        assert!(Postgres.modify_column(&table, column, column).is_nil());
    }

    #[test]
    fn test_normalize_type_aliases() {
        assert_eq!(Postgres.normalize_type("character varying(255)"), "varchar(255)");
        assert_eq!(Postgres.normalize_type("timestamp without time zone"), "timestamp");
        assert_eq!(Postgres.normalize_type("int4"), "integer");
        assert_eq!(Postgres.normalize_type("BIGINT"), "bigint");
    }

    #[test]
    fn test_schema_and_database() {
        assert_eq!(Postgres.create_schema("app").sql(), "CREATE SCHEMA IF NOT EXISTS app");
        assert_eq!(Postgres.create_database("app").sql(), "CREATE DATABASE \"app\"");
        assert_eq!(Postgres.conflict_code(), "23505");
    }
}
