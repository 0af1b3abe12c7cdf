mod file_config;

pub use file_config::{FileConfig, ImportConfig, ServerFileConfig};

use crate::graph::Neo4jConfig;
use crate::ingest::AttributionMode;
use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;

pub const DEFAULT_DATABASE: &str = "neo4j";
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_MAX_CONNECTIONS: usize = 8;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub neo4j_uri: Option<String>,
    pub neo4j_username: Option<String>,
    pub neo4j_password: Option<String>,
    pub neo4j_database: Option<String>,
    pub chunk_size: Option<usize>,
    pub attribution: Option<AttributionMode>,
    pub strict: bool,
    pub show_progress: bool,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub connection: ConnectionSettings,
    pub import: ImportSettings,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

/// Connection parameters as resolved; any of them may still be missing.
#[derive(Clone, Default)]
pub struct ConnectionSettings {
    pub uri: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub max_connections: usize,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl ConnectionSettings {
    /// Returns the driver configuration, naming the first missing parameter.
    pub fn neo4j_config(&self) -> Result<Neo4jConfig> {
        let uri = self
            .uri
            .clone()
            .ok_or_else(|| anyhow!("NEO4J_URI must be set (environment, --neo4j-uri or config file)"))?;
        let username = self.username.clone().ok_or_else(|| {
            anyhow!("NEO4J_USERNAME must be set (environment, --neo4j-username or config file)")
        })?;
        let password = self.password.clone().ok_or_else(|| {
            anyhow!("NEO4J_PASSWORD must be set (environment, --neo4j-password or config file)")
        })?;
        Ok(Neo4jConfig {
            uri,
            username,
            password,
            database: self.database.clone(),
            max_connections: self.max_connections,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub chunk_size: usize,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub backoff_multiplier: f64,
    pub max_delay_secs: u64,
    pub attribution: AttributionMode,
    /// Skip and count malformed rows instead of aborting the run.
    pub skip_malformed: bool,
    pub show_progress: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_attempts: 3,
            retry_delay_secs: 3,
            backoff_multiplier: 1.0,
            max_delay_secs: 60,
            attribution: AttributionMode::default(),
            skip_malformed: true,
            show_progress: true,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let connection = ConnectionSettings {
            uri: file.neo4j_uri.or_else(|| cli.neo4j_uri.clone()),
            username: file.neo4j_username.or_else(|| cli.neo4j_username.clone()),
            password: file.neo4j_password.or_else(|| cli.neo4j_password.clone()),
            database: file
                .neo4j_database
                .or_else(|| cli.neo4j_database.clone())
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            max_connections: file.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
        };

        // Import settings - merge file config with defaults
        let defaults = ImportSettings::default();
        let import_file = file.import.unwrap_or_default();
        let attribution = match import_file.attribution {
            Some(s) => AttributionMode::from_str(&s, true)
                .map_err(|_| anyhow!("Invalid attribution mode in config file: {}", s))?,
            None => cli.attribution.unwrap_or(defaults.attribution),
        };
        let import = ImportSettings {
            chunk_size: import_file
                .chunk_size
                .or(cli.chunk_size)
                .unwrap_or(defaults.chunk_size),
            max_attempts: import_file.max_attempts.unwrap_or(defaults.max_attempts),
            retry_delay_secs: import_file
                .retry_delay_secs
                .unwrap_or(defaults.retry_delay_secs),
            backoff_multiplier: import_file
                .backoff_multiplier
                .unwrap_or(defaults.backoff_multiplier),
            max_delay_secs: import_file.max_delay_secs.unwrap_or(defaults.max_delay_secs),
            attribution,
            skip_malformed: import_file.skip_malformed.unwrap_or(!cli.strict),
            show_progress: cli.show_progress,
        };

        if import.chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }
        if import.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if !import.backoff_multiplier.is_finite() || import.backoff_multiplier < 1.0 {
            bail!(
                "backoff_multiplier must be a number >= 1.0, got {}",
                import.backoff_multiplier
            );
        }

        let server_file = file.server.unwrap_or_default();
        let port = server_file.port.unwrap_or(cli.port);
        let logging_level = server_file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(Self {
            connection,
            import,
            port,
            logging_level,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
