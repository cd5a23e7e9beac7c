use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frequency_server::config::{AppConfig, CliConfig, FileConfig};
use frequency_server::ingestion::{IngestionPipeline, MediaVault};
use frequency_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};
use frequency_server::{ServerState, SongStore, SqliteSongStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the catalog database.
    #[clap(value_parser = parse_path)]
    pub db_dir: PathBuf,

    /// Optional TOML config file; its values override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Root directory for media storage (uploads/ and coverArt/ live here).
    /// Defaults to the database directory.
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Maximum accepted upload size in megabytes.
    #[clap(long, default_value_t = 30)]
    pub max_upload_size_mb: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
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
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: Some(cli_args.db_dir),
        media_path: cli_args.media_path,
        port: cli_args.port,
        metrics_port: cli_args.metrics_port,
        logging_level: cli_args.logging_level,
        max_upload_size_mb: cli_args.max_upload_size_mb,
        frontend_dir_path: cli_args.frontend_dir_path,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening catalog database in {:?}...", config.db_dir);
    let song_store = Arc::new(SqliteSongStore::new(&config.catalog_db_path())?);

    let vault = MediaVault::new(config.uploads_dir(), config.covers_dir());
    vault
        .init()
        .await
        .context("Failed to prepare media directories")?;

    info!("Initializing metrics...");
    metrics::init_metrics();
    metrics::set_songs_count(song_store.songs_count());

    let pipeline = Arc::new(IngestionPipeline::new(vault, song_store.clone()));

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        max_upload_size_mb: config.max_upload_size_mb,
        frontend_dir_path: config.frontend_dir_path.clone(),
    };
    let state = ServerState::new(server_config, song_store, pipeline);

    run_server(state, config.metrics_port).await
}
