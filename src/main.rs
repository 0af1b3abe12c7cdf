use anyhow::{Context, Result};
use catalog_graph::catalog::CatalogGraph;
use catalog_graph::config::{AppConfig, CliConfig, FileConfig};
use catalog_graph::graph::{GraphStore, Neo4jGraphStore};
use catalog_graph::ingest::AttributionMode;
use catalog_graph::server::{config::DEFAULT_PORT, run_server, RequestsLoggingLevel};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(long, env = "NEO4J_URI")]
    pub neo4j_uri: Option<String>,

    #[clap(long, env = "NEO4J_USERNAME")]
    pub neo4j_username: Option<String>,

    #[clap(long, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub neo4j_password: Option<String>,

    #[clap(long, env = "NEO4J_DATABASE")]
    pub neo4j_database: Option<String>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Which artists of a created track get a PLAYS_GENRE relationship.
    #[clap(long, value_enum)]
    pub attribution: Option<AttributionMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        neo4j_uri: cli_args.neo4j_uri,
        neo4j_username: cli_args.neo4j_username,
        neo4j_password: cli_args.neo4j_password,
        neo4j_database: cli_args.neo4j_database,
        attribution: cli_args.attribution,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        ..Default::default()
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let store = Neo4jGraphStore::connect(&config.connection.neo4j_config()?)
        .await
        .context("Failed to connect to the graph database")?;
    store
        .verify_connectivity()
        .await
        .context("Connectivity check failed")?;

    let catalog =
        CatalogGraph::new(Arc::new(store)).with_attribution(config.import.attribution);

    info!("Ready to serve at port {}!", config.port);
    run_server(catalog, config.logging_level, config.port).await
}
