//! Registry of the tables a program works with.

use oxide_query::builder::{columns_and_values, Addition, Assignments, Insert, SqlValue, StmtInsert};
use oxide_query::schema::{Columns, FieldValues, Model, Table, Tables};
use oxide_query::BuildError;
use tracing::debug;

use crate::error::{Result, SqlError};

/// Environment variable naming the feature branch a database belongs to.
pub const PROJECT_FEATURE_ENV: &str = "PROJECT_FEATURE";

/// A named database and its registered tables.
///
/// Tables are registered once at startup; afterwards the registry is only
/// read, typically through an `Arc<Database>` shared by all executors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    pub name: String,
    pub schema: Option<String>,
    tables: Tables,
}

impl Database {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            tables: Tables::new(),
        }
    }

    /// Like [`new`](Self::new), with `__$PROJECT_FEATURE` appended to the
    /// name when that variable is set and not empty.
    #[must_use]
    pub fn feature(name: &str) -> Self {
        match std::env::var(PROJECT_FEATURE_ENV) {
            Ok(feature) if !feature.is_empty() => Self::new(format!("{name}__{feature}")),
            _ => Self::new(name),
        }
    }

    /// Moves the database, and every table registered so far, into `schema`.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        for table in self.tables.iter_mut() {
            table.schema = Some(schema.clone());
        }
        self.schema = Some(schema);
        self
    }

    /// Describes `M` and registers its table.
    ///
    /// # Errors
    ///
    /// Fails when the description is malformed or breaks a table invariant.
    pub fn register<M: Model>(&mut self) -> Result<&Table> {
        let table = M::describe()?;
        self.add_table(table)
    }

    /// Registers a table, placing it in the database schema.
    ///
    /// # Errors
    ///
    /// Fails when the table breaks an invariant.
    pub fn add_table(&mut self, mut table: Table) -> Result<&Table> {
        table.check()?;
        if self.schema.is_some() {
            table.schema.clone_from(&self.schema);
        }
        debug!(database = %self.name, table = %table.name, "Registering table");
        Ok(self.tables.add(table))
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// The table registered for `M`.
    ///
    /// # Errors
    ///
    /// Fails with [`SqlError::Config`] when `M` has not been registered.
    pub fn table_of<M: Model>(&self) -> Result<&Table> {
        self.table(M::table_name()).ok_or_else(|| {
            SqlError::Config(format!("table `{}` is not registered", M::table_name()))
        })
    }

    /// Registered tables in name order.
    #[must_use]
    pub const fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Field values of `model` worth writing: non-zero ones plus
    /// `zero_fields`, never the auto-increment column.
    fn writable_values<M: Model>(
        table: &Table,
        model: &M,
        zero_fields: &[&str],
    ) -> Result<(Columns, Vec<SqlValue>)> {
        let auto_increment = table.auto_increment().map(|c| c.field_name.as_str());
        let values: FieldValues = model.field_values().non_zero(zero_fields);

        let mut columns = Columns::new();
        let mut args = Vec::with_capacity(values.len());
        for (field, value) in values.iter() {
            if Some(field) == auto_increment {
                continue;
            }
            let column = table.field(field).ok_or_else(|| BuildError::UnknownField {
                table: table.name.clone(),
                field: String::from(field),
            })?;
            columns.push(column.clone());
            args.push(value.clone());
        }
        Ok((columns, args))
    }

    /// `SET` assignments for the written fields of `model`.
    ///
    /// # Errors
    ///
    /// Fails when `M` is not registered or exposes an undeclared field.
    pub fn assignments<M: Model>(&self, model: &M, zero_fields: &[&str]) -> Result<Assignments> {
        let table = self.table_of::<M>()?;
        let (columns, values) = Self::writable_values(table, model, zero_fields)?;
        Ok(columns
            .into_iter()
            .zip(values)
            .map(|(column, value)| column.value_by(value))
            .collect())
    }

    /// `INSERT` of the written fields of `model`.
    ///
    /// # Errors
    ///
    /// Fails when `M` is not registered, exposes an undeclared field, or has
    /// nothing to write.
    pub fn insert<M: Model>(
        &self,
        model: &M,
        zero_fields: &[&str],
        additions: impl IntoIterator<Item = Addition>,
    ) -> Result<StmtInsert> {
        let table = self.table_of::<M>()?;
        let (columns, values) = Self::writable_values(table, model, zero_fields)?;
        let assignment = columns_and_values(columns, values)?;
        Ok(Insert::new().into_table(table, additions).assignment(assignment))
    }
}
