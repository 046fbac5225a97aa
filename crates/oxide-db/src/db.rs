//! Pool-backed executor.

use std::sync::Arc;

use oxide_query::builder::SqlExpr;
use oxide_query::dialect::{self, Dialect};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, FromRow};
use tracing::info;

use crate::config::DbConfig;
use crate::context::Context;
use crate::database::Database;
use crate::error::{Result, SqlError};
use crate::exec::{ExecResult, Runner};
use crate::tasks::Tasks;
use crate::tx::Tx;

/// A registered [`Database`] bound to a dialect, a connection pool and a
/// [`Context`].
///
/// Cheap to clone; clones share the pool and the registry.
#[derive(Debug, Clone)]
pub struct Db {
    database: Arc<Database>,
    dialect: Arc<dyn Dialect>,
    pool: AnyPool,
    ctx: Context,
}

impl Db {
    /// Connects to the database named after `database` on the server of
    /// `config`. The dialect comes from [`DbConfig::dialect_name`]; a
    /// configured schema is applied to the registry.
    ///
    /// # Errors
    ///
    /// `Config` for an unknown dialect or an unusable URL, or the connection
    /// error.
    pub async fn connect(database: Database, config: &DbConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let dialect_name = config.dialect_name()?;
        let dialect = dialect::by_name(dialect_name)
            .ok_or_else(|| SqlError::Config(format!("unsupported dialect `{dialect_name}`")))?;
        let database = match &config.schema {
            Some(schema) => database.with_schema(schema.clone()),
            None => database,
        };

        let url = config.url_for(&database.name)?;
        info!(
            database = %database.name,
            url = %config.masked_url(),
            dialect = dialect.name(),
            "Connecting"
        );
        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&url)
            .await?;
        Ok(Self::new(database, Arc::from(dialect), pool))
    }

    #[must_use]
    pub fn new(database: Database, dialect: Arc<dyn Dialect>, pool: AnyPool) -> Self {
        Self {
            database: Arc::new(database),
            dialect,
            pool,
            ctx: Context::background(),
        }
    }

    /// The same database under another context.
    #[must_use]
    pub fn with_context(&self, ctx: Context) -> Self {
        Self {
            ctx,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }

    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.ctx
    }

    fn runner(&self) -> Runner<'_> {
        Runner {
            dialect: self.dialect.as_ref(),
            ctx: &self.ctx,
        }
    }

    /// Runs a statement returning no rows.
    ///
    /// # Errors
    ///
    /// Classified driver errors, or `Cancelled`.
    pub async fn exec(&self, expr: &dyn SqlExpr) -> Result<ExecResult> {
        self.runner().exec(&self.pool, expr).await
    }

    /// # Errors
    ///
    /// Classified driver errors, or `Cancelled`.
    pub async fn query_all<T>(&self, expr: &dyn SqlExpr) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        self.runner().query_all(&self.pool, expr).await
    }

    /// # Errors
    ///
    /// `NotFound` when no row matches, classified driver errors, or
    /// `Cancelled`.
    pub async fn query_one<T>(&self, expr: &dyn SqlExpr) -> Result<T>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        self.runner().query_one(&self.pool, expr).await
    }

    /// # Errors
    ///
    /// `NotFound` when no row matches, classified driver errors, or
    /// `Cancelled`.
    pub async fn query_scalar<T>(&self, expr: &dyn SqlExpr) -> Result<T>
    where
        T: Send + Unpin,
        (T,): for<'r> FromRow<'r, AnyRow>,
    {
        self.runner().query_scalar(&self.pool, expr).await
    }

    /// Hands every row to `each` as it arrives.
    ///
    /// # Errors
    ///
    /// The first error of `each`, classified driver errors, or `Cancelled`.
    pub async fn query_each<F>(&self, expr: &dyn SqlExpr, each: F) -> Result<u64>
    where
        F: FnMut(AnyRow) -> Result<()> + Send,
    {
        self.runner().query_each(&self.pool, expr, each).await
    }

    /// Opens a transaction under this context.
    ///
    /// # Errors
    ///
    /// Classified driver errors, or `Cancelled`.
    pub async fn begin(&self) -> Result<Tx> {
        let dialect = self.dialect.as_ref();
        let inner = self
            .ctx
            .run(async {
                self.pool
                    .begin()
                    .await
                    .map_err(|err| SqlError::classify(err, dialect))
            })
            .await?;
        Ok(Tx::new(inner, Arc::clone(&self.dialect), self.ctx.clone()))
    }

    /// Steps to run in one transaction.
    #[must_use]
    pub fn tasks(&self) -> Tasks<'_> {
        Tasks::new(self)
    }

    /// Closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
