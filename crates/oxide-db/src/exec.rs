//! Statement execution shared by pools and transactions.

use futures::TryStreamExt;
use oxide_query::builder::{Ex, RenderContext, SqlExpr, SqlValue};
use oxide_query::dialect::Dialect;
use sqlx::any::{AnyArguments, AnyQueryResult, AnyRow};
use sqlx::{Any, Arguments, Executor, FromRow};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::context::Context;
use crate::error::{Result, SqlError};

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

impl From<AnyQueryResult> for ExecResult {
    fn from(result: AnyQueryResult) -> Self {
        Self {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        }
    }
}

/// Binds arguments in placeholder order.
///
/// Timestamps are sent as text since the `Any` driver has no native
/// date-time type; dialects with typed parameters cast them back in
/// [`Dialect::finalize`].
pub(crate) fn arguments<'q>(values: &[SqlValue]) -> Result<AnyArguments<'q>> {
    let mut args = AnyArguments::default();
    for value in values {
        let added = match value.clone() {
            SqlValue::Null => args.add(Option::<i64>::None),
            SqlValue::Bool(b) => args.add(b),
            SqlValue::Int(i) => args.add(i),
            SqlValue::Float(f) => args.add(f),
            SqlValue::Text(s) => args.add(s),
            SqlValue::Blob(b) => args.add(b),
            SqlValue::Timestamp(ts) => args.add(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

/// Renders, runs and logs statements under one context and dialect.
pub(crate) struct Runner<'a> {
    pub dialect: &'a dyn Dialect,
    pub ctx: &'a Context,
}

/// A statement ready to run: the neutral rendering, kept for logs, and the
/// dialect's final text and arguments.
struct Prepared {
    neutral: Ex,
    sql: String,
    args: Vec<SqlValue>,
}

impl Runner<'_> {
    fn prepare(&self, expr: &dyn SqlExpr) -> Option<Prepared> {
        if expr.is_nil() {
            return None;
        }
        let neutral = expr.ex(&RenderContext::with_dialect(self.dialect));
        let (sql, args) = self.dialect.finalize(neutral.clone()).into_parts();
        Some(Prepared { neutral, sql, args })
    }

    fn log<T>(&self, prepared: &Prepared, started: Instant, result: &Result<T>) {
        let cost = started.elapsed();
        match result {
            Ok(_) => debug!(cost = ?cost, sql = %prepared.neutral.inline_sql(), "Executed SQL"),
            Err(err @ SqlError::NotFound) => {
                debug!(cost = ?cost, sql = %prepared.neutral.inline_sql(), error = %err, "No rows");
            }
            Err(err @ (SqlError::Conflict(_) | SqlError::Cancelled)) => {
                warn!(cost = ?cost, sql = %prepared.neutral.inline_sql(), error = %err, "SQL failed");
            }
            Err(err) => {
                error!(cost = ?cost, sql = %prepared.neutral.inline_sql(), error = %err, "SQL failed");
            }
        }
    }

    /// Runs a statement returning no rows. Nil expressions do nothing.
    pub async fn exec<'c, E>(&self, executor: E, expr: &dyn SqlExpr) -> Result<ExecResult>
    where
        E: Executor<'c, Database = Any>,
    {
        let Some(prepared) = self.prepare(expr) else {
            return Ok(ExecResult::default());
        };
        let args = arguments(&prepared.args)?;
        let started = Instant::now();
        let result = self
            .ctx
            .run(async {
                sqlx::query_with(&prepared.sql, args)
                    .execute(executor)
                    .await
                    .map(ExecResult::from)
                    .map_err(|err| SqlError::classify(err, self.dialect))
            })
            .await;
        self.log(&prepared, started, &result);
        result
    }

    /// Scans every row into `T`.
    pub async fn query_all<'c, E, T>(&self, executor: E, expr: &dyn SqlExpr) -> Result<Vec<T>>
    where
        E: Executor<'c, Database = Any>,
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let Some(prepared) = self.prepare(expr) else {
            return Ok(Vec::new());
        };
        let args = arguments(&prepared.args)?;
        let started = Instant::now();
        let result = self
            .ctx
            .run(async {
                sqlx::query_as_with::<_, T, _>(&prepared.sql, args)
                    .fetch_all(executor)
                    .await
                    .map_err(|err| SqlError::classify(err, self.dialect))
            })
            .await;
        self.log(&prepared, started, &result);
        result
    }

    /// Scans exactly one row; zero rows is [`SqlError::NotFound`].
    pub async fn query_one<'c, E, T>(&self, executor: E, expr: &dyn SqlExpr) -> Result<T>
    where
        E: Executor<'c, Database = Any>,
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let Some(prepared) = self.prepare(expr) else {
            return Err(SqlError::NotFound);
        };
        let args = arguments(&prepared.args)?;
        let started = Instant::now();
        let result = self
            .ctx
            .run(async {
                sqlx::query_as_with::<_, T, _>(&prepared.sql, args)
                    .fetch_optional(executor)
                    .await
                    .map_err(|err| SqlError::classify(err, self.dialect))?
                    .ok_or(SqlError::NotFound)
            })
            .await;
        self.log(&prepared, started, &result);
        result
    }

    /// First column of the first row; zero rows is [`SqlError::NotFound`].
    pub async fn query_scalar<'c, E, T>(&self, executor: E, expr: &dyn SqlExpr) -> Result<T>
    where
        E: Executor<'c, Database = Any>,
        T: Send + Unpin,
        (T,): for<'r> FromRow<'r, AnyRow>,
    {
        let Some(prepared) = self.prepare(expr) else {
            return Err(SqlError::NotFound);
        };
        let args = arguments(&prepared.args)?;
        let started = Instant::now();
        let result = self
            .ctx
            .run(async {
                sqlx::query_scalar_with::<_, T, _>(&prepared.sql, args)
                    .fetch_optional(executor)
                    .await
                    .map_err(|err| SqlError::classify(err, self.dialect))?
                    .ok_or(SqlError::NotFound)
            })
            .await;
        self.log(&prepared, started, &result);
        result
    }

    /// Streams rows into `each`, stopping at its first error. Returns the
    /// number of rows seen.
    pub async fn query_each<'c, E, F>(
        &self,
        executor: E,
        expr: &dyn SqlExpr,
        mut each: F,
    ) -> Result<u64>
    where
        E: Executor<'c, Database = Any>,
        F: FnMut(AnyRow) -> Result<()> + Send,
    {
        let Some(prepared) = self.prepare(expr) else {
            return Ok(0);
        };
        let args = arguments(&prepared.args)?;
        let started = Instant::now();
        let result = self
            .ctx
            .run(async {
                let mut rows = sqlx::query_with(&prepared.sql, args).fetch(executor);
                let mut seen = 0;
                while let Some(row) = rows
                    .try_next()
                    .await
                    .map_err(|err| SqlError::classify(err, self.dialect))?
                {
                    each(row)?;
                    seen += 1;
                }
                Ok(seen)
            })
            .await;
        self.log(&prepared, started, &result);
        result
    }
}
