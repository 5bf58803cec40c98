//! Operational one-shots against the directory database.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tracing::{error, info};

use service::db::{category_service, directory_service};

/// City guide maintenance tool
#[derive(Parser)]
#[command(name = "maintenance", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create the default categories that are missing
    Seed,
    /// Delete every service (categories are kept)
    ClearServices {
        /// Required confirmation flag
        #[arg(long)]
        yes: bool,
    },
}

async fn execute(command: Commands) -> Result<()> {
    let cfg = configs::AppConfig::load_and_validate()?;
    let db = models::db::connect_with_config(&cfg.database).await?;
    // 所有子命令都先保证表结构就绪
    migration::Migrator::up(&db, None).await?;

    match command {
        Commands::Migrate => {
            info!(service = "maintenance", event = "migrated", "database schema is up to date");
        }
        Commands::Seed => {
            let added = category_service::seed_categories(&db).await?;
            info!(service = "maintenance", event = "seeded", added, "default categories ensured");
        }
        Commands::ClearServices { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete all services without --yes");
            }
            let deleted = directory_service::clear_services(&db).await?;
            info!(service = "maintenance", event = "cleared", deleted, "all services removed");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_default();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "maintenance", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(execute(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "maintenance", event = "failed", error = %e, "maintenance command failed");
            ExitCode::FAILURE
        }
    }
}
