use axum::extract::FromRef;

use crate::catalog_store::SongStore;
use crate::ingestion::IngestionPipeline;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedSongStore = Arc<dyn SongStore>;
pub type GuardedPipeline = Arc<IngestionPipeline>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub song_store: GuardedSongStore,
    pub pipeline: GuardedPipeline,
}

impl ServerState {
    pub fn new(config: ServerConfig, song_store: GuardedSongStore, pipeline: GuardedPipeline) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            song_store,
            pipeline,
        }
    }
}

impl FromRef<ServerState> for GuardedSongStore {
    fn from_ref(input: &ServerState) -> Self {
        input.song_store.clone()
    }
}

impl FromRef<ServerState> for GuardedPipeline {
    fn from_ref(input: &ServerState) -> Self {
        input.pipeline.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
