//! Migrate command - manages the PostgreSQL schema

use clap::{Args, ValueEnum};
use tracing::info;

use crate::infrastructure::storage::{run_migrations, schema_migrations, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// What to do with the schema
    #[arg(value_enum, default_value_t = MigrateAction::Up)]
    pub action: MigrateAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert the latest applied migration
    Down,
    /// Show applied migration versions
    Status,
}

/// Run a migration action against the configured database
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let pool = config.database.postgres().connect().await?;

    match args.action {
        MigrateAction::Up => {
            let applied = run_migrations(&pool).await?;
            info!(applied, "Migrations applied");
        }
        MigrateAction::Down => {
            let migrator = PostgresMigrator::new(pool.clone());

            match migrator.revert_last(&schema_migrations()).await? {
                Some(version) => info!(version, "Reverted migration"),
                None => info!("No migrations to revert"),
            }
        }
        MigrateAction::Status => {
            let migrator = PostgresMigrator::new(pool.clone());
            let applied = migrator.applied_versions().await?;
            let pending: Vec<i64> = schema_migrations()
                .iter()
                .map(|m| m.version)
                .filter(|v| !applied.contains(v))
                .collect();

            info!(?applied, ?pending, "Migration status");
        }
    }

    pool.close().await;
    Ok(())
}
