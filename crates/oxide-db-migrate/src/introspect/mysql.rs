use oxide_db::Db;
use oxide_query::builder::{Ex, SqlValue};
use oxide_query::schema::{Column, ColumnType, CustomType, DataType, Keys, Table};

const COLUMNS: &str = "SELECT \
    CAST(COLUMN_NAME AS CHAR) AS name, \
    CAST(COLUMN_TYPE AS CHAR) AS column_type, \
    CAST(IS_NULLABLE AS CHAR) AS nullable, \
    CAST(COLUMN_DEFAULT AS CHAR) AS default_value, \
    CAST(EXTRA AS CHAR) AS extra, \
    CAST(COLUMN_COMMENT AS CHAR) AS comment \
    FROM information_schema.COLUMNS \
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
    ORDER BY ORDINAL_POSITION";

const INDEXES: &str = "SELECT \
    CAST(INDEX_NAME AS CHAR) AS index_name, \
    CAST(NON_UNIQUE AS SIGNED) AS non_unique, \
    CAST(COLUMN_NAME AS CHAR) AS column_name, \
    CAST(INDEX_TYPE AS CHAR) AS index_type \
    FROM information_schema.STATISTICS \
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
    ORDER BY INDEX_NAME, SEQ_IN_INDEX";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct ColumnRow {
    pub name: String,
    pub column_type: String,
    pub nullable: String,
    pub default_value: Option<String>,
    pub extra: String,
    pub comment: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct IndexRow {
    pub index_name: String,
    pub non_unique: i64,
    pub column_name: String,
    pub index_type: String,
}

pub(super) async fn introspect(db: &Db, table: &Table) -> oxide_db::Result<Option<Table>> {
    let name = || vec![SqlValue::from(table.name.as_str())];
    let columns: Vec<ColumnRow> = db.query_all(&Ex::with_args(COLUMNS, name())).await?;
    if columns.is_empty() {
        return Ok(None);
    }
    let indexes: Vec<IndexRow> = db.query_all(&Ex::with_args(INDEXES, name())).await?;
    Ok(Some(live_table(&table.name, columns, indexes)))
}

pub(super) fn live_table(name: &str, columns: Vec<ColumnRow>, indexes: Vec<IndexRow>) -> Table {
    let mut table = Table::new(name);
    for row in columns {
        let extra = row.extra.to_lowercase();
        let mut column_type = ColumnType::new(DataType::Custom(CustomType::new(row.column_type)));
        column_type.null = row.nullable.eq_ignore_ascii_case("YES");
        column_type.auto_increment = extra.contains("auto_increment");
        column_type.default = row.default_value;
        column_type.on_update = extra
            .find("on update ")
            .map(|at| row.extra[at + "on update ".len()..].trim().to_string());

        let mut column = Column::new(row.name.as_str(), &row.name, column_type);
        if !row.comment.is_empty() {
            column = column.describe(row.comment);
        }
        table = table.with_column(column);
    }

    let mut keys = Keys::default();
    for row in indexes {
        if row.index_name == "PRIMARY" {
            keys.primary.push(row.column_name);
            continue;
        }
        let name = format!("{}/{}", row.index_name.to_lowercase(), row.index_type);
        let named = if row.non_unique == 0 {
            &mut keys.unique_indexes
        } else {
            &mut keys.indexes
        };
        named.entry(name).or_default().push(row.column_name);
    }
    table.with_keys(keys)
}
