//! Music & Mental Health Dashboard
//!
//! CLI commands:
//! - gui: Open the dashboard window (default)
//! - summary: Load the survey once and print the derived views

mod charts;
mod config;
mod gui;
mod join;
mod loader;
mod logging;
mod scale;
mod signal;
mod state;
mod survey;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::charts::bar::order_genres;
use crate::state::SortMode;

#[derive(Parser)]
#[command(name = "mxmh_dashboard")]
#[command(about = "Music listening habits vs. mental health, as linked charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to dashboard.yaml config
    #[arg(short, long, default_value = "dashboard.yaml")]
    config: PathBuf,

    /// CSV path or http(s) URL, overrides config and .env
    #[arg(long)]
    data: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the dashboard window
    Gui,

    /// Load the survey and print the derived views
    Summary {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Genre order
        #[arg(long, value_enum, default_value_t = SortMode::Count)]
        sort: SortMode,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = config::Environment::load();
    logging::init_logging(&env.log_dir)?;
    tracing::info!("Dashboard starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    let mut config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        config::Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        config::Config::with_defaults()
    };
    config.apply_env(&env);
    if let Some(data) = cli.data {
        config.data.source = data;
    }
    tracing::info!("Data source: {}", config.data.source);

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => {
            tracing::info!("Launching dashboard window");
            gui::run_dashboard(config)?;
        }

        Commands::Summary { json, sort } => {
            summary(&config, json, sort).await?;
        }
    }

    Ok(())
}

/// Print the genre aggregate and the sizes of the other views
async fn summary(config: &config::Config, json: bool, sort: SortMode) -> anyhow::Result<()> {
    let data = loader::load_or_empty(&config.data.source).await;
    let genres = order_genres(&data.genres, sort);

    if json {
        let report = serde_json::json!({
            "source": config.data.source,
            "loaded_at": chrono::Local::now().to_rfc3339(),
            "genres": genres,
            "scatter_points": data.scatter.len(),
            "parallel_tuples": data.parallel.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Genres ({}):", genres.len());
    for g in &genres {
        println!("  {:<20} {}", g.genre, g.count);
    }
    println!();
    println!("Scatter points:   {}", data.scatter.len());
    println!("Parallel tuples:  {}", data.parallel.len());
    Ok(())
}
