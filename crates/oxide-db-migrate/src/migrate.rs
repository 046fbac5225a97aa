//! Planning and applying migrations.

use std::io::Write;

use oxide_db::Db;
use oxide_query::migrations::{diff, Operation, Plan};
use tracing::{debug, info};

use crate::error::{MigrateError, Result};
use crate::introspect::introspect;

/// How to apply a plan.
#[derive(Default)]
pub struct MigrateOptions<'a> {
    dry_run: bool,
    progress: Option<&'a mut (dyn Write + Send)>,
}

impl std::fmt::Debug for MigrateOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrateOptions")
            .field("dry_run", &self.dry_run)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> MigrateOptions<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports statements without running them.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Receives every statement, followed by `;`, before it runs.
    #[must_use]
    pub fn progress(mut self, sink: &'a mut (dyn Write + Send)) -> Self {
        self.progress = Some(sink);
        self
    }
}

/// Computes the statements converging every registered table.
///
/// A configured schema is created first (PostgreSQL only), then tables are
/// introspected and diffed in name order.
///
/// # Errors
///
/// Fails when a table cannot be introspected.
pub async fn plan(db: &Db) -> Result<Plan> {
    let dialect = db.dialect();
    let database = db.database();
    let mut plan = Plan::new();

    if let Some(schema) = &database.schema {
        plan.push(
            Operation::CreateSchema {
                schema: schema.clone(),
            },
            dialect.create_schema(schema),
        );
    }

    for table in database.tables().iter() {
        let live = introspect(db, table)
            .await
            .map_err(|source| MigrateError::Introspect {
                table: table.full_name(),
                source,
            })?;
        let table_plan = diff(dialect, live.as_ref(), table);
        debug!(table = %table.full_name(), steps = table_plan.len(), "Planned table");
        plan.extend(table_plan);
    }
    Ok(plan)
}

/// Runs `plan` statement by statement.
///
/// The first failing statement stops the run; statements applied before it
/// are not undone. Returns the number of statements run, or reported in a
/// dry run.
///
/// # Errors
///
/// [`MigrateError::Statement`] with the failing statement, or
/// [`MigrateError::Progress`] when the sink cannot be written.
pub async fn apply_plan(db: &Db, plan: &Plan, options: &mut MigrateOptions<'_>) -> Result<usize> {
    if options.dry_run {
        info!(steps = plan.len(), "Dry run mode - SQL will be printed but not executed");
    }

    let mut applied = 0;
    for step in plan {
        if let Some(sink) = options.progress.as_mut() {
            writeln!(sink, "{};", step.ex.sql()).map_err(MigrateError::Progress)?;
        }
        if options.dry_run {
            applied += 1;
            continue;
        }

        info!(operation = %step.operation, "Applying migration step");
        db.exec(&step.ex)
            .await
            .map_err(|source| MigrateError::Statement {
                statement: String::from(step.ex.sql()),
                source,
            })?;
        applied += 1;
    }
    Ok(applied)
}

/// Plans and applies in one go, returning the plan that was run.
///
/// # Errors
///
/// See [`plan`] and [`apply_plan`].
pub async fn migrate(db: &Db, mut options: MigrateOptions<'_>) -> Result<Plan> {
    let plan = plan(db).await?;
    if plan.is_empty() {
        info!(database = %db.database().name, "Schema is up to date");
        return Ok(plan);
    }
    let applied = apply_plan(db, &plan, &mut options).await?;
    info!(database = %db.database().name, applied, "Migration finished");
    Ok(plan)
}
