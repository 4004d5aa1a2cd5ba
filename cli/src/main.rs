mod commands;
mod config;
mod spoonacular;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    Repository, cmd_browse, cmd_favorite, cmd_favorites, cmd_search, cmd_settings, cmd_show,
};
use crate::config::{API_KEY_ENV, Config, MAX_RECIPE_AMOUNT, Settings};
use crate::spoonacular::SpoonacularClient;
use spoonful_core::db::Database;
use spoonful_core::repository::SyncSettings;

#[derive(Parser)]
#[command(
    name = "spoonful",
    version,
    about = "Browse Spoonacular recipes, cached locally for offline use"
)]
struct Cli {
    /// Log cache and API activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show random recipes (fills the local cache on first use)
    Browse {
        /// Number of recipes to show (default: configured recipe amount)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RECIPE_AMOUNT)))]
        amount: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find recipes whose title contains NAME
    Search {
        /// Title fragment to look for
        name: String,
        /// Maximum number of results (default: configured recipe amount)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RECIPE_AMOUNT)))]
        amount: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with its ingredients and instructions
    Show {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List favorite recipes
    Favorites {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a recipe to favorites, or remove it if it already is one
    Favorite {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change settings
    Settings {
        /// Default number of recipes to show (1-100)
        #[arg(long)]
        amount: Option<u32>,
        /// Spoonacular API key
        #[arg(long)]
        api_key: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut settings = Settings::load(&config.settings_path)?;
    let default_amount = settings.recipe_amount;

    match cli.command {
        Commands::Browse { amount, json } => {
            let repo = open_repository(&config, settings).await?;
            cmd_browse(&repo, amount.unwrap_or(default_amount), json).await
        }
        Commands::Search { name, amount, json } => {
            let repo = open_repository(&config, settings).await?;
            cmd_search(&repo, &name, amount.unwrap_or(default_amount), json).await
        }
        Commands::Show { id, json } => {
            let repo = open_repository(&config, settings).await?;
            cmd_show(&repo, id, json).await
        }
        Commands::Favorites { json } => {
            let repo = open_repository(&config, settings).await?;
            cmd_favorites(&repo, json).await
        }
        Commands::Favorite { id, json } => {
            let repo = open_repository(&config, settings).await?;
            cmd_favorite(&repo, id, json).await
        }
        Commands::Settings {
            amount,
            api_key,
            json,
        } => cmd_settings(&config, &mut settings, amount, api_key, json),
    }
}

async fn open_repository(config: &Config, settings: Settings) -> Result<Repository> {
    let settings = settings.with_env_key(std::env::var(API_KEY_ENV).ok());
    if settings.api_key.is_empty() {
        warn!(
            "No API key configured; only cached recipes are available. \
             Set one with `spoonful settings --api-key <KEY>` or {API_KEY_ENV}"
        );
    }

    let db = Database::open(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database: {}", config.db_path.display()))?;
    let client = SpoonacularClient::new(&settings.base_url)?;
    Ok(Repository::new(
        db,
        client,
        SyncSettings::new(settings.api_key),
    ))
}
