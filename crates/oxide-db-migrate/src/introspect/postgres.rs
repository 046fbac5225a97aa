use oxide_db::Db;
use oxide_query::builder::{Ex, SqlValue};
use oxide_query::schema::{Column, ColumnType, CustomType, DataType, Keys, Table};

const DEFAULT_SCHEMA: &str = "public";

const COLUMNS: &str = "SELECT \
    a.attname::text AS name, \
    pg_catalog.format_type(a.atttypid, a.atttypmod)::text AS data_type, \
    a.attnotnull AS not_null, \
    pg_catalog.pg_get_expr(d.adbin, d.adrelid)::text AS default_value, \
    pg_catalog.col_description(c.oid, a.attnum)::text AS comment \
    FROM pg_catalog.pg_attribute a \
    JOIN pg_catalog.pg_class c ON c.oid = a.attrelid \
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
    LEFT JOIN pg_catalog.pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum \
    WHERE c.relname = ? AND n.nspname = ? AND c.relkind = 'r' \
    AND a.attnum > 0 AND NOT a.attisdropped \
    ORDER BY a.attnum";

const INDEXES: &str = "SELECT \
    i.relname::text AS index_name, \
    ix.indisprimary AS is_primary, \
    ix.indisunique AS is_unique, \
    am.amname::text AS method, \
    a.attname::text AS column_name \
    FROM pg_catalog.pg_index ix \
    JOIN pg_catalog.pg_class t ON t.oid = ix.indrelid \
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace \
    JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid \
    JOIN pg_catalog.pg_am am ON am.oid = i.relam \
    CROSS JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, position) \
    JOIN pg_catalog.pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
    WHERE t.relname = ? AND n.nspname = ? \
    ORDER BY i.relname, k.position";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct ColumnRow {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct IndexRow {
    pub index_name: String,
    pub is_primary: bool,
    pub is_unique: bool,
    pub method: String,
    pub column_name: String,
}

pub(super) async fn introspect(db: &Db, table: &Table) -> oxide_db::Result<Option<Table>> {
    let schema = table.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
    let args = || {
        vec![
            SqlValue::from(table.name.as_str()),
            SqlValue::from(schema),
        ]
    };
    let columns: Vec<ColumnRow> = db.query_all(&Ex::with_args(COLUMNS, args())).await?;
    if columns.is_empty() {
        return Ok(None);
    }
    let indexes: Vec<IndexRow> = db.query_all(&Ex::with_args(INDEXES, args())).await?;
    let mut live = live_table(&table.name, columns, indexes);
    live.schema.clone_from(&table.schema);
    Ok(Some(live))
}

pub(super) fn live_table(name: &str, columns: Vec<ColumnRow>, indexes: Vec<IndexRow>) -> Table {
    let mut table = Table::new(name);
    for row in columns {
        let mut column_type = ColumnType::new(DataType::Custom(CustomType::new(row.data_type)));
        column_type.null = !row.not_null;
        match row.default_value {
            Some(default) if default.starts_with("nextval(") => column_type.auto_increment = true,
            default => column_type.default = default,
        }

        let mut column = Column::new(row.name.as_str(), &row.name, column_type);
        if let Some(comment) = row.comment.filter(|c| !c.is_empty()) {
            column = column.describe(comment);
        }
        table = table.with_column(column);
    }

    let prefix = format!("{name}_");
    let mut keys = Keys::default();
    for row in indexes {
        if row.is_primary {
            keys.primary.push(row.column_name);
            continue;
        }
        let index = row
            .index_name
            .strip_prefix(&prefix)
            .unwrap_or(&row.index_name);
        let key = format!("{index}/{}", row.method);
        let named = if row.is_unique {
            &mut keys.unique_indexes
        } else {
            &mut keys.indexes
        };
        named.entry(key).or_default().push(row.column_name);
    }
    table.with_keys(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_query::dialect::Postgres;
    use oxide_query::migrations::diff;

    fn column(name: &str, data_type: &str, default: Option<&str>) -> ColumnRow {
        ColumnRow {
            name: String::from(name),
            data_type: String::from(data_type),
            not_null: true,
            default_value: default.map(String::from),
            comment: None,
        }
    }

    fn index(name: &str, primary: bool, method: &str, column: &str) -> IndexRow {
        IndexRow {
            index_name: String::from(name),
            is_primary: primary,
            is_unique: true,
            method: String::from(method),
            column_name: String::from(column),
        }
    }

    fn live() -> Table {
        live_table(
            "t_user",
            vec![
                column("f_id", "bigint", Some("nextval('t_user_f_id_seq'::regclass)")),
                column("f_name", "character varying(255)", Some("''::character varying")),
            ],
            vec![
                index("t_user_pkey", true, "btree", "f_id"),
                index("t_user_i_name", false, "btree", "f_name"),
            ],
        )
    }

    #[test]
    fn test_serial_column_is_auto_increment() {
        let live = live();
        let id = live.col("f_id").unwrap();
        assert!(id.column_type.auto_increment);
        assert_eq!(id.column_type.default, None);
    }

    #[test]
    fn test_index_names_lose_table_prefix() {
        let keys = live().keys.all();
        assert_eq!(keys.len(), 2);
        assert!(keys[0].is_primary());
        assert_eq!(keys[1].name, "i_name");
        assert_eq!(keys[1].method.as_deref(), Some("btree"));
    }

    #[test]
    fn test_live_table_converges_with_declaration() {
        let desired = Table::new("t_user")
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement").unwrap())
            .with_column(
                Column::from_tag("Name", DataType::String, "f_name,size=255,default=''").unwrap(),
            )
            .with_keys(Keys::from_defs(["@def primary ID", "@def unique_index I_name Name"]).unwrap());
        assert!(diff(&Postgres, Some(&live()), &desired).is_empty());
    }

    #[test]
    fn test_changed_method_rebuilds_index() {
        let desired = Table::new("t_user")
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement").unwrap())
            .with_column(
                Column::from_tag("Name", DataType::String, "f_name,size=255,default=''").unwrap(),
            )
            .with_keys(
                Keys::from_defs(["@def primary ID", "@def unique_index I_name/HASH Name"]).unwrap(),
            );
        let plan = diff(&Postgres, Some(&live()), &desired);
        let statements: Vec<&str> = plan.statements().collect();
        assert_eq!(
            statements,
            vec![
                "DROP INDEX IF EXISTS t_user_i_name",
                "CREATE UNIQUE INDEX IF NOT EXISTS t_user_i_name ON t_user USING hash (f_name)",
            ]
        );
    }
}
