//! Sequential steps sharing one transaction.

use futures::future::BoxFuture;
use tracing::{debug, error, warn};

use crate::db::Db;
use crate::error::{Result, SqlError};
use crate::tx::Tx;

type Step = Box<dyn for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, Result<()>> + Send>;

/// Steps run one after another in a single transaction.
///
/// The first failing step, or a cancellation of the [`Db`]'s context,
/// stops the run and rolls everything back. Nothing is committed unless
/// every step succeeds.
///
/// ```no_run
/// # async fn transfer(db: &oxide_db::Db) -> oxide_db::Result<()> {
/// use oxide_query::builder::Ex;
///
/// db.tasks()
///     .with(|tx| Box::pin(async move {
///         tx.exec(&Ex::new("UPDATE t_account SET f_credits = f_credits - 1 WHERE f_id = 1")).await?;
///         Ok(())
///     }))
///     .with(|tx| Box::pin(async move {
///         tx.exec(&Ex::new("UPDATE t_account SET f_credits = f_credits + 1 WHERE f_id = 2")).await?;
///         Ok(())
///     }))
///     .run()
///     .await
/// # }
/// ```
pub struct Tasks<'a> {
    db: &'a Db,
    steps: Vec<Step>,
}

impl std::fmt::Debug for Tasks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tasks")
            .field("db", &self.db)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl<'a> Tasks<'a> {
    #[must_use]
    pub fn new(db: &'a Db) -> Self {
        Self {
            db,
            steps: Vec::new(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn with<F>(mut self, step: F) -> Self
    where
        F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, Result<()>> + Send + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step, then commits.
    ///
    /// # Errors
    ///
    /// The error of the first failing step, or `Cancelled`; the transaction
    /// is rolled back in both cases.
    pub async fn run(self) -> Result<()> {
        let ctx = self.db.context().clone();
        let mut tx = self.db.begin().await?;
        let total = self.steps.len();

        for (index, step) in self.steps.into_iter().enumerate() {
            let outcome = ctx.run(step(&mut tx)).await;
            if let Err(err) = outcome {
                warn!(step = index, total, error = %err, "Task step failed");
                abort(tx).await;
                return Err(err);
            }
            debug!(step = index, total, "Task step done");
        }

        if ctx.is_cancelled() {
            abort(tx).await;
            return Err(SqlError::Cancelled);
        }
        tx.commit().await
    }
}

/// Rolls back, keeping the original failure as the reported error.
async fn abort(tx: Tx) {
    if let Err(err) = tx.rollback().await {
        error!(error = %err, "Rollback failed");
    }
}
