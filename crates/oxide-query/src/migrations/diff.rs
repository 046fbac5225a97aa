//! Live versus declared table comparison.

use std::collections::BTreeMap;

use super::operation::{Operation, Plan};
use crate::dialect::Dialect;
use crate::schema::{Key, Table};

/// Computes the statements turning `live` into `desired`.
///
/// Without a live table the whole table is created. Otherwise, in this
/// order: column renames, column additions and changes in declaration
/// order, dropped or changed keys, dropped columns, then new or changed
/// keys. Live columns the declaration does not mention are left alone.
#[must_use]
pub fn diff(dialect: &dyn Dialect, live: Option<&Table>, desired: &Table) -> Plan {
    let mut plan = Plan::new();
    let Some(live) = live else {
        for ex in dialect.create_table(desired) {
            plan.push(
                Operation::CreateTable {
                    table: desired.name.clone(),
                },
                ex,
            );
        }
        return plan;
    };

    let mut working = live.clone();
    working.name.clone_from(&desired.name);
    working.schema.clone_from(&desired.schema);

    let mut column_drops = Vec::new();

    // Renames first, so that a rename target declared before its old
    // column is not added as a new column.
    for column in &desired.columns {
        let Some(deprecated) = &column.column_type.deprecated else {
            continue;
        };
        match &deprecated.rename_to {
            Some(target) => {
                if working.col(&column.name).is_none() || working.col(target).is_some() {
                    continue;
                }
                let target = target.to_lowercase();
                plan.push(
                    Operation::RenameColumn {
                        table: desired.name.clone(),
                        from: column.name.clone(),
                        to: target.clone(),
                    },
                    dialect.rename_column(desired, &column.name, &target),
                );
                if let Some(renamed) = working.columns.get_mut(&column.name) {
                    renamed.name = target;
                }
            }
            None => {
                if working.col(&column.name).is_some() {
                    column_drops.push(column.name.clone());
                }
            }
        }
    }

    for column in desired.columns.iter().filter(|c| !c.is_deprecated()) {
        match working.col(&column.name).cloned() {
            None => {
                plan.push(
                    Operation::AddColumn {
                        table: desired.name.clone(),
                        column: column.name.clone(),
                    },
                    dialect.add_column(desired, column),
                );
                working.columns.push(column.clone());
            }
            Some(existing)
                if dialect.column_type_changed(&existing.column_type, &column.column_type) =>
            {
                plan.push(
                    Operation::ModifyColumn {
                        table: desired.name.clone(),
                        column: column.name.clone(),
                    },
                    dialect.modify_column(desired, column, &existing),
                );
            }
            Some(_) => {}
        }
    }

    let live_keys = keys_by_name(&working);
    let desired_keys = keys_by_name(desired);

    let mut key_adds = Vec::new();
    for (name, key) in &desired_keys {
        match live_keys.get(name) {
            None => key_adds.push(key),
            Some(existing) if key_changed(dialect, &working, existing, desired, key) => {
                key_adds.push(key);
            }
            Some(_) => {}
        }
    }

    for (name, existing) in &live_keys {
        let dropped = match desired_keys.get(name) {
            None => true,
            Some(key) => key_changed(dialect, &working, existing, desired, key),
        };
        if dropped {
            plan.push(
                Operation::DropKey {
                    table: desired.name.clone(),
                    key: name.clone(),
                },
                dialect.drop_index(&working, existing),
            );
        }
    }

    for name in column_drops {
        plan.push(
            Operation::DropColumn {
                table: desired.name.clone(),
                column: name.clone(),
            },
            dialect.drop_column(desired, &name),
        );
    }

    for key in key_adds {
        plan.push(
            Operation::AddKey {
                table: desired.name.clone(),
                key: key.name.clone(),
            },
            dialect.add_index(desired, key),
        );
    }

    plan
}

fn keys_by_name(table: &Table) -> BTreeMap<String, Key> {
    table
        .keys
        .all()
        .into_iter()
        .map(|key| (key.name.to_lowercase(), key))
        .collect()
}

fn key_changed(
    dialect: &dyn Dialect,
    live_table: &Table,
    live: &Key,
    desired_table: &Table,
    desired: &Key,
) -> bool {
    live.kind != desired.kind
        || live_table.key_columns(live) != desired_table.key_columns(desired)
        || (desired.method.is_some()
            && dialect.index_method(desired.method.as_deref())
                != dialect.index_method(live.method.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};
    use crate::schema::{Column, ColumnType, CustomType, DataType, Keys};

    fn desired() -> Table {
        Table::new("t_user")
            .with_column(Column::from_tag("ID", DataType::UInt64, "f_id,autoincrement").unwrap())
            .with_column(Column::from_tag("Name", DataType::String, "f_name,default=''").unwrap())
            .with_keys(
                Keys::default()
                    .with_primary(["ID"])
                    .with_unique_index("I_name", ["Name"]),
            )
    }

    /// What MySQL reports back for [`desired`].
    fn live() -> Table {
        let mut id = ColumnType::new(DataType::Custom(CustomType::new("bigint(20) unsigned")));
        id.auto_increment = true;
        let name = ColumnType::new(DataType::Custom(CustomType::new("varchar(255)"))).with_default("");
        Table::new("t_user")
            .with_column(Column::new("f_id", "f_id", id))
            .with_column(Column::new("f_name", "f_name", name))
            .with_keys(
                Keys::default()
                    .with_primary(["f_id"])
                    .with_unique_index("i_name/BTREE", ["f_name"]),
            )
    }

    #[test]
    fn test_missing_table_is_created() {
        let plan = diff(&MySql, None, &desired());
        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan.steps()[0].operation,
            Operation::CreateTable {
                table: String::from("t_user")
            }
        );
    }

    #[test]
    fn test_introspected_table_is_converged() {
        assert!(diff(&MySql, Some(&live()), &desired()).is_empty());
    }

    #[test]
    fn test_undeclared_live_column_is_kept() {
        let live = live().with_column(Column::new(
            "f_extra",
            "f_extra",
            ColumnType::new(DataType::Custom(CustomType::new("int"))),
        ));
        assert!(diff(&MySql, Some(&live), &desired()).is_empty());
    }

    #[test]
    fn test_changed_key_is_dropped_then_added() {
        let desired = desired().with_keys(
            Keys::default()
                .with_primary(["ID"])
                .with_index("I_name", ["Name"]),
        );
        let plan = diff(&MySql, Some(&live()), &desired);
        let statements: Vec<&str> = plan.statements().collect();
        assert_eq!(
            statements,
            vec![
                "DROP INDEX i_name ON t_user",
                "CREATE INDEX i_name ON t_user (f_name)"
            ]
        );
    }

    #[test]
    fn test_rename_then_modify() {
        let desired = desired()
            .with_column(Column::from_tag("Nick", DataType::String, "f_nick,size=64,null").unwrap())
            .with_column(
                Column::from_tag("OldNick", DataType::String, "f_old_nick,null,deprecated=f_nick")
                    .unwrap(),
            );
        let live = live().with_column(Column::new(
            "f_old_nick",
            "f_old_nick",
            ColumnType::new(DataType::Custom(CustomType::new("varchar(32)"))).nullable(true),
        ));
        let plan = diff(&MySql, Some(&live), &desired);
        let statements: Vec<&str> = plan.statements().collect();
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE t_user RENAME COLUMN f_old_nick TO f_nick",
                "ALTER TABLE t_user MODIFY COLUMN f_nick varchar(64)",
            ]
        );
    }

    #[test]
    fn test_deprecated_without_target_is_dropped_after_key_drops() {
        let desired = desired()
            .with_column(Column::from_tag("Legacy", DataType::String, "f_legacy,deprecated").unwrap())
            .with_keys(Keys::default().with_primary(["ID"]));
        let live = live().with_column(Column::new(
            "f_legacy",
            "f_legacy",
            ColumnType::new(DataType::Custom(CustomType::new("varchar(255)"))),
        ));
        let plan = diff(&MySql, Some(&live), &desired);
        let operations: Vec<String> = plan.steps().iter().map(|s| s.operation.to_string()).collect();
        assert_eq!(
            operations,
            vec!["drop key t_user.i_name", "drop column t_user.f_legacy"]
        );
    }

    #[test]
    fn test_postgres_modify_nil_is_skipped() {
        let mut live = live();
        // Only the auto-increment flag differs, which PostgreSQL cannot alter.
        if let Some(id) = live.columns.get_mut("f_id") {
            id.column_type.data_type = DataType::Custom(CustomType::new("bigint"));
            id.column_type.auto_increment = false;
        }
        if let Some(name) = live.columns.get_mut("f_name") {
            name.column_type.data_type = DataType::Custom(CustomType::new("character varying(255)"));
            name.column_type.default = Some(String::from("''::character varying"));
        }
        live.keys = Keys::default()
            .with_primary(["f_id"])
            .with_unique_index("i_name", ["f_name"]);
        assert!(diff(&Postgres, Some(&live), &desired()).is_empty());
    }
}
