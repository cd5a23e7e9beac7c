//! Catalog data models.

use serde::{Deserialize, Serialize};

/// A persisted catalog record for one stored song.
///
/// Serialized field names are the canonical ones the clients consume:
/// `file` and `coverArt` are public paths, never filesystem paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Public audio path, e.g. `/uploads/My Song.mp3`.
    pub file: String,
    /// Public cover path, e.g. `/coverArt/My Song.png`.
    #[serde(rename = "coverArt")]
    pub cover_art: String,
    /// Playback length in whole seconds.
    pub duration: u64,
    /// Creation time in Unix milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Fields of a record about to be created. The store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub file: String,
    pub cover_art: String,
    pub duration: u64,
}
