//! Frequency Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog_store;
pub mod config;
pub mod ingestion;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog_store::{NewSong, Song, SongStore, SqliteSongStore};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use ingestion::{IngestionPipeline, MediaVault, UploadRequest};
pub use server::state::ServerState;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
