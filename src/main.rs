//! Jarvis CLI entry point.

use anyhow::Result;
use clap::Parser;
use jarvis::cli::{commands, Cli, Commands};
use jarvis::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("jarvis={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match cli.command {
        Commands::Chat { model, collection } => {
            commands::run_chat(model, collection, settings).await?;
        }

        Commands::Ask {
            message,
            model,
            collection,
        } => {
            commands::run_ask(&message, model, collection, settings).await?;
        }

        Commands::Add {
            id,
            attributes,
            collection,
        } => {
            commands::run_add(&id, &attributes, collection, settings).await?;
        }

        Commands::Import { file, collection } => {
            commands::run_import(&file, collection, settings).await?;
        }

        Commands::Search {
            query,
            limit,
            collection,
        } => {
            commands::run_search(&query, limit, collection, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, cli.config.as_deref(), settings)?;
        }
    }

    Ok(())
}
