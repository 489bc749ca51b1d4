mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "creatordb-cli")]
#[command(about = "creatordb command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations.
    Migrate,
    /// Pull fresh platform metrics for one creator.
    Sync {
        /// Public id of the creator.
        creator_id: Uuid,
    },
    /// Pull fresh platform metrics for every creator.
    SyncAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = creatordb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = creatordb_db::connect_pool_from_config(&config).await?;

    match cli.command {
        Commands::Migrate => {
            let applied = creatordb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Sync { creator_id } => {
            let service = sync::build_service(pool, &config)?;
            sync::run_sync_one(&service, creator_id).await?;
        }
        Commands::SyncAll => {
            let service = sync::build_service(pool, &config)?;
            sync::run_sync_all(&service).await?;
        }
    }

    Ok(())
}
