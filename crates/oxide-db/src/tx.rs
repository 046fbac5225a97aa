//! Transactions.

use std::fmt;
use std::sync::Arc;

use oxide_query::builder::SqlExpr;
use oxide_query::dialect::Dialect;
use sqlx::any::AnyRow;
use sqlx::{Any, FromRow, Transaction};
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{Result, SqlError};
use crate::exec::{ExecResult, Runner};

/// An open transaction.
///
/// Dropping it without [`commit`](Self::commit) rolls it back.
pub struct Tx {
    inner: Transaction<'static, Any>,
    dialect: Arc<dyn Dialect>,
    ctx: Context,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("dialect", &self.dialect.name())
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl Tx {
    pub(crate) fn new(
        inner: Transaction<'static, Any>,
        dialect: Arc<dyn Dialect>,
        ctx: Context,
    ) -> Self {
        debug!("Begin transaction");
        Self { inner, dialect, ctx }
    }

    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.ctx
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Runs a statement inside the transaction.
    ///
    /// # Errors
    ///
    /// Classified driver errors, or `Cancelled`.
    pub async fn exec(&mut self, expr: &dyn SqlExpr) -> Result<ExecResult> {
        let runner = Runner {
            dialect: self.dialect.as_ref(),
            ctx: &self.ctx,
        };
        runner.exec(&mut *self.inner, expr).await
    }

    /// # Errors
    ///
    /// Classified driver errors, or `Cancelled`.
    pub async fn query_all<T>(&mut self, expr: &dyn SqlExpr) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let runner = Runner {
            dialect: self.dialect.as_ref(),
            ctx: &self.ctx,
        };
        runner.query_all(&mut *self.inner, expr).await
    }

    /// # Errors
    ///
    /// `NotFound` when no row matches, classified driver errors, or
    /// `Cancelled`.
    pub async fn query_one<T>(&mut self, expr: &dyn SqlExpr) -> Result<T>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let runner = Runner {
            dialect: self.dialect.as_ref(),
            ctx: &self.ctx,
        };
        runner.query_one(&mut *self.inner, expr).await
    }

    /// # Errors
    ///
    /// `NotFound` when no row matches, classified driver errors, or
    /// `Cancelled`.
    pub async fn query_scalar<T>(&mut self, expr: &dyn SqlExpr) -> Result<T>
    where
        T: Send + Unpin,
        (T,): for<'r> FromRow<'r, AnyRow>,
    {
        let runner = Runner {
            dialect: self.dialect.as_ref(),
            ctx: &self.ctx,
        };
        runner.query_scalar(&mut *self.inner, expr).await
    }

    /// # Errors
    ///
    /// Fails when the commit fails; the transaction is gone either way.
    pub async fn commit(self) -> Result<()> {
        self.inner
            .commit()
            .await
            .map_err(|err| SqlError::classify(err, self.dialect.as_ref()))?;
        debug!("Commit transaction");
        Ok(())
    }

    /// # Errors
    ///
    /// Fails when the rollback fails.
    pub async fn rollback(self) -> Result<()> {
        warn!("Rollback transaction");
        self.inner
            .rollback()
            .await
            .map_err(|err| SqlError::classify(err, self.dialect.as_ref()))
    }
}
