//! Tables and table registries.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::column::{Column, Columns};
use super::key::{Key, Keys};
use crate::builder::ex::{Ex, RenderContext, SqlExpr};
use crate::error::{BuildError, Result};

/// A table description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(default)]
    pub columns: Columns,
    #[serde(default)]
    pub keys: Keys,
    /// Name of the model type the table was described from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            description: Vec::new(),
            columns: Columns::new(),
            keys: Keys::default(),
            model: None,
        }
    }

    /// Places the table in a schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Replaces the keys.
    #[must_use]
    pub fn with_keys(mut self, keys: Keys) -> Self {
        self.keys = keys;
        self
    }

    /// Adds a description line.
    #[must_use]
    pub fn describe(mut self, line: impl Into<String>) -> Self {
        self.description.push(line.into());
        self
    }

    /// Binds the table to a model type name.
    #[must_use]
    pub fn bind_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// `schema.name`, or just the name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Column by database name.
    #[must_use]
    pub fn col(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Column by model field name.
    #[must_use]
    pub fn field(&self, field_name: &str) -> Option<&Column> {
        self.columns.by_field(field_name)
    }

    /// The auto-increment column, if any.
    #[must_use]
    pub fn auto_increment(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.column_type.auto_increment)
    }

    /// Columns for the given field names, in the given order.
    ///
    /// # Errors
    ///
    /// Fails when a field is not declared.
    pub fn fields<'a>(&self, field_names: impl IntoIterator<Item = &'a str>) -> Result<Columns> {
        field_names
            .into_iter()
            .map(|field| {
                self.field(field)
                    .cloned()
                    .ok_or_else(|| self.unknown_field(field))
            })
            .collect()
    }

    /// Columns that are not deprecated, in declaration order.
    #[must_use]
    pub fn active_columns(&self) -> Columns {
        self.columns
            .iter()
            .filter(|c| !c.is_deprecated())
            .cloned()
            .collect()
    }

    /// Database column names of a key. Names that match no field are
    /// taken as database names already.
    #[must_use]
    pub fn key_columns(&self, key: &Key) -> Vec<String> {
        key.fields
            .iter()
            .map(|field| {
                self.field(field)
                    .or_else(|| self.col(field))
                    .map_or_else(|| field.to_lowercase(), |c| c.name.clone())
            })
            .collect()
    }

    /// Checks the table invariants: unique field names, keys referencing
    /// declared fields, declared rename targets and valid column types.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.field_name.as_str()) {
                return Err(BuildError::DuplicateField {
                    table: self.name.clone(),
                    field: column.field_name.clone(),
                });
            }
            column.column_type.check()?;

            let target = column
                .column_type
                .deprecated
                .as_ref()
                .and_then(|d| d.rename_to.as_deref());
            if let Some(target) = target {
                if self.col(target).is_none() {
                    return Err(BuildError::UndeclaredRenameTarget {
                        table: self.name.clone(),
                        column: column.name.clone(),
                        target: String::from(target),
                    });
                }
            }
        }

        for key in self.keys.all() {
            for field in &key.fields {
                if self.field(field).is_none() {
                    return Err(self.unknown_field(field));
                }
            }
        }
        for field in &self.keys.partition {
            if self.field(field).is_none() {
                return Err(self.unknown_field(field));
            }
        }
        Ok(())
    }

    fn unknown_field(&self, field: &str) -> BuildError {
        BuildError::UnknownField {
            table: self.name.clone(),
            field: String::from(field),
        }
    }
}

impl SqlExpr for Table {
    fn ex(&self, _ctx: &RenderContext<'_>) -> Ex {
        Ex::new(self.full_name())
    }
}

/// Tables by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tables(BTreeMap<String, Table>);

impl Tables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any table with the same name.
    pub fn add(&mut self, table: Table) -> &Table {
        match self.0.entry(table.name.clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(table);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(table),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.0.get(name)
    }

    /// Tables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.0.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.0.values_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
