//! Graph Import Tool
//!
//! This binary imports a track catalog CSV into the graph database, chunk by
//! chunk, and reports what the graph contains afterwards.

use anyhow::{bail, Context, Result};
use catalog_graph::config::{AppConfig, CliConfig, FileConfig};
use catalog_graph::graph::{GraphStore, MemoryGraphStore, Neo4jGraphStore};
use catalog_graph::ingest::{AttributionMode, ImportPipeline};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "graph-import")]
#[command(about = "Import a track catalog CSV into the graph database")]
struct Args {
    /// Path to the CSV file.
    #[arg(value_name = "CSV_PATH", required_unless_present = "check")]
    csv_path: Option<PathBuf>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = "NEO4J_URI")]
    neo4j_uri: Option<String>,

    #[arg(long, env = "NEO4J_USERNAME")]
    neo4j_username: Option<String>,

    #[arg(long, env = "NEO4J_PASSWORD", hide_env_values = true)]
    neo4j_password: Option<String>,

    #[arg(long, env = "NEO4J_DATABASE")]
    neo4j_database: Option<String>,

    /// Rows per write chunk.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Which artists of a track get a PLAYS_GENRE relationship.
    #[arg(long, value_enum)]
    attribution: Option<AttributionMode>,

    /// Abort on the first malformed row instead of skipping it.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Run the whole pipeline against an in-memory graph.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Only verify connectivity and print the current graph counts.
    #[arg(long, default_value_t = false, conflicts_with = "dry_run")]
    check: bool,

    #[arg(long, default_value_t = false)]
    no_progress: bool,
}

impl Args {
    fn cli_config(&self) -> CliConfig {
        CliConfig {
            neo4j_uri: self.neo4j_uri.clone(),
            neo4j_username: self.neo4j_username.clone(),
            neo4j_password: self.neo4j_password.clone(),
            neo4j_database: self.neo4j_database.clone(),
            chunk_size: self.chunk_size,
            attribution: self.attribution,
            strict: self.strict,
            show_progress: !self.no_progress,
            ..Default::default()
        }
    }
}

async fn open_store(args: &Args, config: &AppConfig) -> Result<Arc<dyn GraphStore>> {
    if args.dry_run {
        info!("Dry run: writing to an in-memory graph");
        return Ok(Arc::new(MemoryGraphStore::new()));
    }
    let neo4j_config = config.connection.neo4j_config()?;
    let store = Neo4jGraphStore::connect(&neo4j_config)
        .await
        .context("Failed to connect to the graph database")?;
    Ok(Arc::new(store))
}

async fn check(store: &dyn GraphStore) -> Result<()> {
    store
        .verify_connectivity()
        .await
        .context("Connectivity check failed")?;
    info!("Connection OK");

    let counts = store.counts().await?;
    info!("");
    info!("Graph contains:");
    for (label, count) in counts.rows() {
        info!("  {}: {}", label, count);
    }
    Ok(())
}

async fn run(args: Args) -> Result<bool> {
    let file_config = match &args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&args.cli_config(), file_config)?;

    info!("Graph Import Tool");
    info!("=================");

    let store = open_store(&args, &config).await?;

    if args.check {
        check(store.as_ref()).await?;
        return Ok(true);
    }

    let Some(csv_path) = args.csv_path.as_deref() else {
        bail!("CSV_PATH is required");
    };
    info!("Input: {}", csv_path.display());

    let pipeline = ImportPipeline::new(store, config.import);
    let summary = pipeline
        .run(csv_path)
        .await
        .with_context(|| format!("Import of {} failed", csv_path.display()))?;
    summary.log();

    Ok(!summary.has_failures())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("Import finished with failed chunks");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
