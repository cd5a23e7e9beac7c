//! Upload ingestion pipeline.
//!
//! One call walks a raw upload buffer through sniffing, tag extraction, name
//! allocation, asset writes and catalog recording:
//!
//! received -> sniffed -> (rejected | accepted) -> tags extracted
//!          -> audio written -> cover resolved -> recorded
//!
//! Stage failure policy is encoded in the types: stages that may abort the
//! call return `Result<_, IngestError>`, stages that may only degrade are
//! matched and recovered in place with a logged fallback. Tag extraction and
//! cover persistence can never fail an ingestion; a missing audio write or
//! catalog record always does.
//!
//! Calls are independent: the only shared state is the filesystem and the
//! catalog store. Name uniqueness is checked against a directory snapshot
//! taken once per call, so two concurrent uploads racing on the same name can
//! both see it as free. That race is accepted; no locking or retry is done
//! here, and a failed call can simply be resubmitted by the caller.

use super::media_vault::{self, MediaVault, DEFAULT_COVER_PATH};
use super::metadata::{self, EmbeddedPicture, ExtractedTags};
use super::naming::{self, AUDIO_EXT};
use super::sniff::{self, SniffVerdict};
use crate::catalog_store::{NewSong, Song, SongStore};
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name recorded when the tag block carries no usable artist.
pub const DEFAULT_ARTIST: &str = "Unknown Artist";

/// One upload, as handed over by the transport layer. Lives for exactly one
/// `ingest` call.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    /// Filename as declared by the client. Used for name derivation only,
    /// never for type acceptance.
    pub declared_filename: String,
    /// Content type as declared by the client. Diagnostics only.
    pub declared_mime: Option<String>,
}

/// Fatal ingestion outcomes. Soft degradations (tags, cover art) never show
/// up here; they are absorbed inside the pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The request carried no file at all. Detected before any read of the
    /// buffer, no side effects.
    #[error("no file present in the upload request")]
    MissingInput,

    /// Magic-byte sniffing did not recognize a supported audio container.
    /// Nothing was written.
    #[error("unsupported upload content")]
    RejectedType { verdict: SniffVerdict },

    /// The audio asset could not be written. The record was never created.
    #[error("audio asset write failed: {0}")]
    Storage(#[source] io::Error),

    /// The catalog write failed after the audio asset was stored. The asset
    /// stays on disk; no compensating delete is attempted.
    #[error("catalog record creation failed: {0}")]
    Persistence(#[from] anyhow::Error),
}

/// Sequences one upload through validation, extraction and persistence.
pub struct IngestionPipeline {
    vault: MediaVault,
    catalog: Arc<dyn SongStore>,
}

impl IngestionPipeline {
    pub fn new(vault: MediaVault, catalog: Arc<dyn SongStore>) -> Self {
        Self { vault, catalog }
    }

    pub fn media(&self) -> &MediaVault {
        &self.vault
    }

    /// Run the full pipeline for one upload and return the created record.
    pub async fn ingest(&self, upload: UploadRequest) -> Result<Song, IngestError> {
        let verdict = sniff::sniff(&upload.bytes);
        if !verdict.is_accepted() {
            warn!(
                "Rejected upload {:?}: detected {:?}, declared {:?}",
                upload.declared_filename, verdict.detected, upload.declared_mime
            );
            return Err(IngestError::RejectedType { verdict });
        }
        if let Some(declared) = &upload.declared_mime {
            if declared != "audio/mpeg" {
                // The declared type is advisory only; log the disagreement
                // and trust the sniffed bytes.
                debug!(
                    "Declared content type {:?} disagrees with sniffed {:?} for {:?}",
                    declared, verdict.detected, upload.declared_filename
                );
            }
        }

        let tags = match metadata::extract(&upload.bytes) {
            Ok(tags) => tags,
            Err(err) => {
                warn!(
                    "Tag extraction degraded for {:?}: {}",
                    upload.declared_filename, err
                );
                ExtractedTags::default()
            }
        };

        let existing = self
            .vault
            .snapshot_upload_names()
            .await
            .map_err(IngestError::Storage)?;
        let resolved = naming::allocate(&upload.declared_filename, AUDIO_EXT, &existing);
        self.vault
            .write_audio(&resolved.filename, &upload.bytes)
            .await
            .map_err(IngestError::Storage)?;
        let file = media_vault::public_audio_path(&resolved.filename);

        let audio_base = resolved
            .filename
            .strip_suffix(&format!(".{}", AUDIO_EXT))
            .unwrap_or(&resolved.filename)
            .to_string();
        let cover_art = match &tags.picture {
            None => DEFAULT_COVER_PATH.to_string(),
            Some(picture) => match self.store_cover(picture, &audio_base).await {
                Ok(path) => path,
                Err(err) => {
                    warn!(
                        "Cover art write degraded for {:?}: {}",
                        upload.declared_filename, err
                    );
                    DEFAULT_COVER_PATH.to_string()
                }
            },
        };

        let title = non_empty(tags.title)
            .unwrap_or_else(|| naming::title_from_filename(&resolved.base));
        let artist = non_empty(tags.artist).unwrap_or_else(|| DEFAULT_ARTIST.to_string());
        let album = tags.album.as_deref().unwrap_or("").trim().to_string();

        let new_song = NewSong {
            title,
            artist,
            album,
            file,
            cover_art,
            duration: tags.duration_secs,
        };
        let song = self.catalog.create_song(&new_song)?;

        info!(
            "Ingested {:?} as {:?} (duration {}s)",
            upload.declared_filename, song.file, song.duration
        );
        Ok(song)
    }

    async fn store_cover(&self, picture: &EmbeddedPicture, base: &str) -> io::Result<String> {
        let existing = self.vault.snapshot_cover_names().await?;
        let ext = naming::cover_extension(picture.mime.as_deref());
        let resolved = naming::allocate(base, ext, &existing);
        self.vault.write_cover(&resolved.filename, &picture.data).await?;
        Ok(media_vault::public_cover_path(&resolved.filename))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
