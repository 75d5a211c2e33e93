mod ingest;
mod migrate;
mod recipe;
mod report;
mod seed;
mod storage;
mod watch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pantry_core::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Admin tools for the recipe site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the incoming folder and ingest new recipe images
    Watch,
    /// Ingest a single image file and exit
    Ingest {
        /// Path to the image; the filename stem must match a recipe slug
        file: std::path::PathBuf,
    },
    /// Insert sample categories and recipes (skips existing ones)
    Seed,
    /// Read-only reports over the live data
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
    /// Inspect or remove individual recipes
    Recipe {
        #[command(subcommand)]
        recipe: RecipeCommand,
    },
    /// One-off data migrations
    Migrate {
        #[command(subcommand)]
        migrate: MigrateCommand,
    },
    /// Object storage housekeeping
    Storage {
        #[command(subcommand)]
        storage: StorageCommand,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Category usage: every categoryPath in use, with recipe counts
    Categories,
    /// Recipes that have no image yet
    MissingImages {
        /// Maximum number of slugs to list
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Document counts for every collection
    Overview,
}

#[derive(Subcommand)]
enum RecipeCommand {
    /// Print one recipe as JSON
    Get { slug: String },
    /// Delete one recipe
    Delete { slug: String },
}

#[derive(Subcommand)]
enum MigrateCommand {
    /// Re-point every recipe under one category path to another
    RenameCategory {
        /// Current category path
        #[arg(long)]
        from: String,
        /// New category path
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand)]
enum StorageCommand {
    /// List stored objects
    List {
        /// Key prefix to list under
        #[arg(long, default_value = pantry_core::config::IMAGE_KEY_PREFIX)]
        prefix: String,
    },
    /// Delete every object under a prefix, after a short abort window
    Cleanup {
        /// Key prefix to delete under (required, never empty)
        #[arg(long)]
        prefix: String,
        /// Seconds to wait before deleting; ctrl-c during the wait aborts
        #[arg(long, default_value_t = pantry_core::config::DEFAULT_CLEANUP_DELAY_SECS)]
        delay_secs: u64,
    },
}

/// Console logging via RUST_LOG (default `info`), written to stderr so
/// command output on stdout stays clean.
fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Watch => {
            watch::run(&config).await?;
        }
        Commands::Ingest { file } => {
            ingest::run(&config, &file).await?;
        }
        Commands::Seed => {
            seed::run(&config).await?;
        }
        Commands::Report { report } => match report {
            ReportCommand::Categories => report::categories(&config).await?,
            ReportCommand::MissingImages { limit } => report::missing_images(&config, limit).await?,
            ReportCommand::Overview => report::overview(&config).await?,
        },
        Commands::Recipe { recipe } => match recipe {
            RecipeCommand::Get { slug } => recipe::get(&config, &slug).await?,
            RecipeCommand::Delete { slug } => recipe::delete(&config, &slug).await?,
        },
        Commands::Migrate { migrate } => match migrate {
            MigrateCommand::RenameCategory { from, to } => {
                migrate::rename_category(&config, &from, &to).await?;
            }
        },
        Commands::Storage { storage } => match storage {
            StorageCommand::List { prefix } => storage::list(&config, &prefix).await?,
            StorageCommand::Cleanup { prefix, delay_secs } => {
                storage::cleanup(&config, &prefix, delay_secs).await?;
            }
        },
    }

    Ok(())
}
