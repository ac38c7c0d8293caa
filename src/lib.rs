//! Synastry Engine
//!
//! Relational chart synthesis and consistency engine:
//! - Neo4j as the durable store for source entities and derived charts
//! - A write-through in-process cache mirroring the store
//! - An external computation service for synastry and composite charts
//! - Lookup-or-create plus best-effort fan-out recomputation on entity change

pub mod api;
pub mod cache;
pub mod engine;
pub mod neo4j;
pub mod synthesis;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub neo4j: Neo4jYamlConfig,
    pub engine: EngineYamlConfig,
    pub cache: CacheYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "synastry123".into(),
        }
    }
}

/// Computation engine configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineYamlConfig {
    pub url: String,
    /// Bounded per-request timeout; a timed-out computation is treated
    /// like any other computation failure and nothing is persisted
    pub timeout_secs: u64,
}

impl Default for EngineYamlConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9400".into(),
            timeout_secs: 15,
        }
    }
}

/// Cache configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheYamlConfig {
    /// Maximum number of cached charts
    pub capacity: u64,
}

impl Default for CacheYamlConfig {
    fn default() -> Self {
        Self { capacity: 10_000 }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub engine_url: String,
    pub engine_timeout_secs: u64,
    pub cache_capacity: u64,
    pub server_port: u16,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            engine_url: std::env::var("ENGINE_URL").unwrap_or(yaml.engine.url),
            engine_timeout_secs: std::env::var("ENGINE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.engine.timeout_secs),
            cache_capacity: std::env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.cache.capacity),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Application state and server entry point
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub neo4j: Arc<dyn neo4j::ChartStore>,
    pub cache: Arc<dyn cache::ChartCache>,
    pub engine: Arc<dyn engine::ChartEngine>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state with all services initialized
    pub async fn new(config: Config) -> Result<Self> {
        let neo4j = Arc::new(
            neo4j::client::Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let cache = Arc::new(cache::MemoryChartCache::new(config.cache_capacity));

        let engine = Arc::new(engine::HttpChartEngine::new(
            &config.engine_url,
            config.engine_timeout_secs,
        )?);

        Ok(Self {
            neo4j,
            cache,
            engine,
            config: Arc::new(config),
        })
    }

    /// Build the synthesizer over this state's store, cache, and engine
    pub fn synthesizer(&self) -> synthesis::ChartSynthesizer {
        synthesis::ChartSynthesizer::new(
            self.neo4j.clone(),
            self.cache.clone(),
            self.engine.clone(),
        )
    }
}

/// Start the HTTP server and serve until shutdown
pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server_port;
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let server_state = Arc::new(api::handlers::ServerState {
        synthesizer: Arc::new(state.synthesizer()),
    });

    let router = api::create_router(server_state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Synastry engine listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
