//! oxide-db-migrate CLI
//!
//! Converges a database to the tables declared in a JSON schema file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_db::{Db, DbConfig};
use oxide_db_migrate::{apply_plan, plan, MigrateOptions, SchemaFile};

/// Declarative schema migrations for MySQL and PostgreSQL.
#[derive(Parser)]
#[command(name = "oxide-db-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server URL (`mysql://...` or `postgres://...`); the database is the
    /// one named in the schema file.
    #[arg(short, long, env = "DATABASE_URL")]
    database_url: String,

    /// Dialect, when the URL scheme does not tell.
    #[arg(long)]
    dialect: Option<String>,

    /// Schema to place every table in, overriding the schema file.
    #[arg(long)]
    schema: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the statements a migration would run.
    Plan {
        /// JSON file declaring the tables.
        schema_file: PathBuf,
    },

    /// Apply the difference between the schema file and the database.
    Migrate {
        /// JSON file declaring the tables.
        schema_file: PathBuf,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    fn schema_file(&self) -> &PathBuf {
        match self {
            Self::Plan { schema_file } | Self::Migrate { schema_file, .. } => schema_file,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let database = SchemaFile::load(cli.command.schema_file())?.into_database()?;
    info!(database = %database.name, tables = database.tables().len(), "Loaded schema file");

    let mut config = DbConfig::new(cli.database_url);
    if let Some(dialect) = cli.dialect {
        config = config.with_dialect(dialect);
    }
    if let Some(schema) = cli.schema {
        config = config.with_schema(schema);
    }
    let db = Db::connect(database, &config).await?;

    let planned = plan(&db).await?;
    match cli.command {
        Commands::Plan { .. } => {
            if planned.is_empty() {
                info!("Schema is up to date.");
            } else {
                print!("{planned}");
            }
        }
        Commands::Migrate { dry_run, .. } => {
            if planned.is_empty() {
                info!("Schema is up to date.");
            } else {
                let mut stdout = std::io::stdout();
                let mut options = MigrateOptions::new().dry_run(dry_run).progress(&mut stdout);
                let applied = apply_plan(&db, &planned, &mut options).await?;
                info!(applied, "Migration finished.");
            }
        }
    }

    db.close().await;
    Ok(())
}
