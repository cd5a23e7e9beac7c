//! Upload ingestion: type sniffing, tag extraction, name allocation and
//! multi-artifact persistence.
//!
//! Pipeline per upload:
//! 1. Sniff the buffer's real container type from magic bytes
//! 2. Extract embedded tags, duration and cover art (best effort)
//! 3. Allocate a collision-free filesystem name
//! 4. Write the audio asset, then the cover art
//! 5. Record the song in the catalog

mod media_vault;
mod metadata;
mod naming;
mod pipeline;
mod sniff;

pub use media_vault::{
    public_audio_path, public_cover_path, MediaVault, DEFAULT_COVER_PATH, PUBLIC_COVERS_PREFIX,
    PUBLIC_UPLOADS_PREFIX,
};
pub use metadata::{extract, EmbeddedPicture, ExtractedTags, TagReadError};
pub use naming::{
    allocate, cover_extension, title_from_filename, ResolvedName, AUDIO_EXT, FALLBACK_BASE,
    MAX_BASE_LEN,
};
pub use pipeline::{IngestError, IngestionPipeline, UploadRequest, DEFAULT_ARTIST};
pub use sniff::{sniff, DetectedType, SniffVerdict, SniffedKind};
