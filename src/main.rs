//! Synastry Engine - Main Server
//!
//! Relational chart synthesis over Neo4j with an external computation service.

use anyhow::Result;
use clap::{Parser, Subcommand};
use synastry_engine::{synthesis::EntityRole, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "synastry")]
#[command(about = "Relational chart synthesis engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the synthesis server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Recompute all charts referencing an entity
    Propagate {
        /// Entity id whose charts should be recomputed
        #[arg(short, long)]
        entity_id: String,

        /// Role of the entity (person, associate, or organization)
        #[arg(short, long)]
        role: EntityRole,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,synastry_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port } => {
            config.server_port = port;
            synastry_engine::start_server(config).await
        }
        Commands::Propagate { entity_id, role } => run_propagate(config, &entity_id, role).await,
    }
}

async fn run_propagate(config: Config, entity_id: &str, role: EntityRole) -> Result<()> {
    tracing::info!("Propagating update for {} {}", role, entity_id);

    // Initialize application state
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let synthesizer = state.synthesizer();
    let summary = synthesizer.propagate_update(entity_id, role).await?;

    tracing::info!(
        "Propagation complete: {} charts found, {} updated, {} skipped",
        summary.charts_found,
        summary.charts_updated,
        summary.charts_skipped
    );

    Ok(())
}
