//! On-disk storage for audio assets and cover art.
//!
//! Owns the two media directories, hands out point-in-time name snapshots for
//! collision checks, and performs the actual writes.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Public prefix under which audio assets are served.
pub const PUBLIC_UPLOADS_PREFIX: &str = "/uploads";

/// Public prefix under which cover art is served.
pub const PUBLIC_COVERS_PREFIX: &str = "/coverArt";

/// Canonical cover path used whenever a song has no stored cover of its own.
pub const DEFAULT_COVER_PATH: &str = "/coverArt/default.webp";

const DEFAULT_COVER_FILENAME: &str = "default.webp";

// Minimal 1x1 lossless WebP, written once so the placeholder path always
// resolves to a real file.
const PLACEHOLDER_COVER_WEBP: &[u8] = &[
    0x52, 0x49, 0x46, 0x46, 0x1A, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50, 0x56, 0x50, 0x38,
    0x4C, 0x0E, 0x00, 0x00, 0x00, 0x2F, 0x00, 0x00, 0x00, 0x10, 0x07, 0x10, 0x11, 0x11, 0x88,
    0x88, 0xFE, 0x07, 0x00,
];

/// Filesystem home of uploaded audio and extracted cover art.
#[derive(Debug, Clone)]
pub struct MediaVault {
    uploads_dir: PathBuf,
    covers_dir: PathBuf,
}

impl MediaVault {
    pub fn new(uploads_dir: impl Into<PathBuf>, covers_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            covers_dir: covers_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn covers_dir(&self) -> &Path {
        &self.covers_dir
    }

    /// Create both directories and make sure the default cover exists.
    pub async fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.uploads_dir).await?;
        fs::create_dir_all(&self.covers_dir).await?;

        let placeholder = self.covers_dir.join(DEFAULT_COVER_FILENAME);
        if fs::try_exists(&placeholder).await? {
            return Ok(());
        }
        fs::write(&placeholder, PLACEHOLDER_COVER_WEBP).await?;
        info!("Wrote placeholder cover art at {:?}", placeholder);
        Ok(())
    }

    /// Snapshot of the filenames currently present in the uploads directory.
    pub async fn snapshot_upload_names(&self) -> io::Result<HashSet<String>> {
        Self::list_names(&self.uploads_dir).await
    }

    /// Snapshot of the filenames currently present in the covers directory.
    pub async fn snapshot_cover_names(&self) -> io::Result<HashSet<String>> {
        Self::list_names(&self.covers_dir).await
    }

    /// Persist the validated audio buffer. Failure here is fatal to the
    /// calling pipeline.
    pub async fn write_audio(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.uploads_dir.join(filename);
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Persist extracted cover art bytes.
    pub async fn write_cover(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.covers_dir.join(filename);
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn list_names(dir: &Path) -> io::Result<HashSet<String>> {
        let mut names = HashSet::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// Public path for a stored audio filename.
pub fn public_audio_path(filename: &str) -> String {
    format!("{}/{}", PUBLIC_UPLOADS_PREFIX, filename)
}

/// Public path for a stored cover filename.
pub fn public_cover_path(filename: &str) -> String {
    format!("{}/{}", PUBLIC_COVERS_PREFIX, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault_in(tmp: &TempDir) -> MediaVault {
        MediaVault::new(tmp.path().join("uploads"), tmp.path().join("coverArt"))
    }

    #[tokio::test]
    async fn test_init_creates_dirs_and_placeholder() {
        let tmp = TempDir::new().unwrap();
        let vault = vault_in(&tmp);
        vault.init().await.unwrap();

        assert!(vault.uploads_dir().is_dir());
        assert!(vault.covers_dir().join("default.webp").is_file());

        // Re-init must not clobber an existing placeholder.
        std::fs::write(vault.covers_dir().join("default.webp"), b"custom").unwrap();
        vault.init().await.unwrap();
        let kept = std::fs::read(vault.covers_dir().join("default.webp")).unwrap();
        assert_eq!(kept, b"custom");
    }

    #[tokio::test]
    async fn test_snapshot_reflects_writes() {
        let tmp = TempDir::new().unwrap();
        let vault = vault_in(&tmp);
        vault.init().await.unwrap();

        assert!(vault.snapshot_upload_names().await.unwrap().is_empty());
        vault.write_audio("one.mp3", b"x").await.unwrap();
        vault.write_audio("two.mp3", b"y").await.unwrap();

        let names = vault.snapshot_upload_names().await.unwrap();
        assert!(names.contains("one.mp3"));
        assert!(names.contains("two.mp3"));
        assert_eq!(names.len(), 2);

        let covers = vault.snapshot_cover_names().await.unwrap();
        assert!(covers.contains("default.webp"));
    }

    #[test]
    fn test_public_paths() {
        assert_eq!(public_audio_path("a.mp3"), "/uploads/a.mp3");
        assert_eq!(public_cover_path("a.png"), "/coverArt/a.png");
    }
}
