//! Migration plans.

use std::fmt;

use serde::Serialize;

use crate::builder::ex::{Ex, SqlExpr};

/// A schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateSchema { schema: String },
    CreateTable { table: String },
    AddColumn { table: String, column: String },
    RenameColumn { table: String, from: String, to: String },
    ModifyColumn { table: String, column: String },
    DropColumn { table: String, column: String },
    AddKey { table: String, key: String },
    DropKey { table: String, key: String },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateSchema { schema } => write!(f, "create schema {schema}"),
            Self::CreateTable { table } => write!(f, "create table {table}"),
            Self::AddColumn { table, column } => write!(f, "add column {table}.{column}"),
            Self::RenameColumn { table, from, to } => {
                write!(f, "rename column {table}.{from} to {to}")
            }
            Self::ModifyColumn { table, column } => write!(f, "modify column {table}.{column}"),
            Self::DropColumn { table, column } => write!(f, "drop column {table}.{column}"),
            Self::AddKey { table, key } => write!(f, "add key {table}.{key}"),
            Self::DropKey { table, key } => write!(f, "drop key {table}.{key}"),
        }
    }
}

/// One operation and the statement carrying it out.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub operation: Operation,
    pub ex: Ex,
}

/// Ordered statements converging a live table to its declaration.
///
/// Plans are computed fresh on every run and never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step. Nil statements are dropped.
    pub fn push(&mut self, operation: Operation, ex: Ex) {
        if !ex.is_nil() {
            self.steps.push(Step { operation, ex });
        }
    }

    /// Appends all steps of `other`.
    pub fn extend(&mut self, other: Self) {
        self.steps.extend(other.steps);
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Statement texts in order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.ex.sql())
    }
}

impl IntoIterator for Plan {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// SQL script form: each statement followed by `;`.
impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sql in self.statements() {
            writeln!(f, "{sql};")?;
        }
        Ok(())
    }
}
