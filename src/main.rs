mod config;
mod dispatcher;
mod models;
mod query;
mod render;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use dispatcher::QueryDispatcher;
use render::TerminalRegion;
use server::AppState;
use std::sync::Arc;
use tools::HttpAnalysisBackend;
use tracing::info;

/// Asks the news analysis service for an article covering a recent period.
#[derive(Parser)]
#[command(name = "news-radar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Analysis endpoint (overrides RADAR_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one query and print the rendered fragments
    Ask {
        /// How many units back to look; empty means 1
        #[arg(long)]
        time_value: Option<String>,

        /// Unit of time, e.g. "дней"
        #[arg(long)]
        time_unit: Option<String>,
    },

    /// Host the query page
    Serve {
        /// Port to listen on (overrides RADAR_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_radar=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    let backend = HttpAnalysisBackend::new(config.endpoint.clone(), config.timeout)?;
    info!("Using analysis endpoint {}", backend.endpoint());
    let dispatcher = QueryDispatcher::new(Arc::new(backend));

    match cli.command {
        Commands::Ask {
            time_value,
            time_unit,
        } => {
            let outcome = dispatcher
                .dispatch(time_value.as_deref(), time_unit.as_deref(), &TerminalRegion)
                .await;
            info!(
                ticket = outcome.ticket,
                query = %outcome.query,
                applied = outcome.applied,
                "Query finished"
            );
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            server::serve(AppState::new(dispatcher), port).await?;
        }
    }

    Ok(())
}
