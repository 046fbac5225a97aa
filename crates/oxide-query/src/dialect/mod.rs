//! SQL dialect support.
//!
//! Builders render dialect-neutral SQL with `?` placeholders. A [`Dialect`]
//! knows the native type names, the DDL templates and the placeholder style
//! of one engine family, and translates neutral SQL with
//! [`Dialect::finalize`] right before execution.

mod mysql;
mod postgres;

pub use mysql::MySql;
pub use postgres::Postgres;

use std::fmt;

use crate::builder::ex::{Ex, RenderContext};
use crate::builder::OnConflict;
use crate::schema::{Column, ColumnType, Key, Table};

/// Engine-specific SQL generation.
///
/// DDL methods return a nil [`Ex`] when there is nothing to run; callers skip
/// those.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Lower-case dialect name, also the key of [`CustomType`](crate::schema::CustomType)
    /// overrides.
    fn name(&self) -> &'static str;

    /// Quotes an identifier.
    fn quote(&self, ident: &str) -> String;

    /// Placeholder for the `index`-th argument, counting from 1.
    fn placeholder(&self, index: usize) -> String;

    /// Native type of a column type, without modifiers.
    fn data_type(&self, column_type: &ColumnType) -> String;

    /// Canonical spelling of a native type, so that a type read back from the
    /// engine compares equal to the one this dialect renders.
    fn normalize_type(&self, native: &str) -> String;

    /// `name type modifiers` as used in `CREATE TABLE` and `ADD COLUMN`.
    fn column_definition(&self, column: &Column) -> String;

    /// The table, then any statement the engine needs outside of it.
    fn create_table(&self, table: &Table) -> Vec<Ex>;

    /// `DROP TABLE`; nil for an unnamed table.
    fn drop_table(&self, table: &Table) -> Ex {
        if table.name.is_empty() {
            return Ex::default();
        }
        Ex::new(format!("DROP TABLE IF EXISTS {}", table.full_name()))
    }

    fn truncate_table(&self, table: &Table) -> Ex {
        Ex::new(format!("TRUNCATE TABLE {}", table.full_name()))
    }

    fn add_column(&self, table: &Table, column: &Column) -> Ex {
        Ex::new(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            table.full_name(),
            self.column_definition(column)
        ))
    }

    fn rename_column(&self, table: &Table, from: &str, to: &str) -> Ex {
        Ex::new(format!(
            "ALTER TABLE {} RENAME COLUMN {from} TO {to}",
            table.full_name()
        ))
    }

    /// Alters `previous` into `column`; nil when nothing can be altered.
    fn modify_column(&self, table: &Table, column: &Column, previous: &Column) -> Ex;

    fn drop_column(&self, table: &Table, name: &str) -> Ex {
        Ex::new(format!(
            "ALTER TABLE {} DROP COLUMN {name}",
            table.full_name()
        ))
    }

    fn add_index(&self, table: &Table, key: &Key) -> Ex;

    fn drop_index(&self, table: &Table, key: &Key) -> Ex;

    fn create_database(&self, name: &str) -> Ex;

    /// `DROP DATABASE`; nil for an empty name.
    fn drop_database(&self, name: &str) -> Ex {
        if name.is_empty() {
            return Ex::default();
        }
        Ex::new(format!("DROP DATABASE IF EXISTS {}", self.quote(name)))
    }

    /// `CREATE SCHEMA`; nil where schemas and databases are the same thing.
    fn create_schema(&self, name: &str) -> Ex;

    /// Conflict handling of an `INSERT`.
    fn upsert_clause(&self, conflict: &OnConflict, ctx: &RenderContext<'_>) -> Ex;

    /// Engine error code of a unique key violation.
    fn conflict_code(&self) -> &'static str;

    /// Native index method for a `/METHOD` key suffix, if supported.
    fn index_method(&self, method: Option<&str>) -> Option<String>;

    /// Translates neutral `?` placeholders into the native style. Question
    /// marks inside quoted text and comments are left alone.
    fn finalize(&self, ex: Ex) -> Ex {
        if self.placeholder(1) == "?" {
            return ex;
        }
        let (sql, args) = ex.into_parts();
        Ex::with_args(rewrite_placeholders(&sql, |i| self.placeholder(i)), args)
    }

    /// Whether migrating `live` to `desired` needs a column change.
    fn column_type_changed(&self, live: &ColumnType, desired: &ColumnType) -> bool {
        self.normalize_type(&self.data_type(live)) != self.normalize_type(&self.data_type(desired))
            || live.null != desired.null
            || live.auto_increment != desired.auto_increment
            || normalize_default(live.default.as_deref())
                != normalize_default(desired.default.as_deref())
            || normalize_on_update(live.on_update.as_deref())
                != normalize_on_update(desired.on_update.as_deref())
    }
}

/// Looks a dialect up by name or URL scheme.
#[must_use]
pub fn by_name(name: &str) -> Option<Box<dyn Dialect>> {
    match name.to_ascii_lowercase().as_str() {
        "mysql" | "mariadb" => Some(Box::new(MySql)),
        "postgres" | "postgresql" | "pg" => Some(Box::new(Postgres)),
        _ => None,
    }
}

/// Canonical form of a default literal: casts and surrounding quotes
/// stripped, lower-cased, `NULL` meaning no default.
#[must_use]
pub fn normalize_default(default: Option<&str>) -> Option<String> {
    let mut value = default?.trim();
    while let Some(pos) = value.rfind("::") {
        if value[pos..].contains('\'') {
            break;
        }
        value = value[..pos].trim_end();
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value = &value[1..value.len() - 1];
    }
    let value = value.to_lowercase();
    if value == "null" {
        None
    } else {
        Some(value)
    }
}

/// `ON UPDATE` expression compared case-insensitively, with `f()` equal
/// to `f`.
fn normalize_on_update(on_update: Option<&str>) -> Option<String> {
    let value = on_update?.trim().to_lowercase();
    let value = value.strip_suffix("()").map_or(value.as_str(), str::trim_end);
    (!value.is_empty()).then(|| String::from(value))
}

/// Single-quoted SQL literal.
pub(crate) fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// `(a,b)` from the resolved columns of `key`.
pub(crate) fn key_column_list(table: &Table, key: &Key) -> String {
    format!("({})", table.key_columns(key).join(","))
}

/// Rewrites every `?` outside quoted text and comments with `placeholder(n)`,
/// `n` counting from 1.
pub(crate) fn rewrite_placeholders(
    sql: &str,
    mut placeholder: impl FnMut(usize) -> String,
) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut index = 0;
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                for next in chars.by_ref() {
                    out.push(next);
                    if next == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(c);
                for next in chars.by_ref() {
                    out.push(next);
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push(c);
                if let Some(star) = chars.next() {
                    out.push(star);
                }
                let mut prev = ' ';
                for next in chars.by_ref() {
                    out.push(next);
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '?' => {
                index += 1;
                out.push_str(&placeholder(index));
            }
            _ => out.push(c),
        }
    }
    out
}
