//! Seeding utility: scan an existing uploads directory and (re)build catalog
//! records for the audio files found there, using the same sniffing and tag
//! extraction as the upload pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frequency_server::ingestion::{
    self, public_audio_path, public_cover_path, MediaVault, DEFAULT_COVER_PATH,
};
use frequency_server::{NewSong, SongStore, SqliteSongStore};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the catalog database.
    pub db_dir: PathBuf,

    /// Root directory for media storage (uploads/ and coverArt/ live here).
    /// Defaults to the database directory.
    #[clap(long)]
    pub media_path: Option<PathBuf>,

    /// Delete every existing record before seeding.
    #[clap(long)]
    pub replace: bool,
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

    let media_path = cli_args.media_path.unwrap_or_else(|| cli_args.db_dir.clone());
    let store = SqliteSongStore::new(&cli_args.db_dir.join("catalog.db"))?;
    let vault = MediaVault::new(media_path.join("uploads"), media_path.join("coverArt"));
    vault
        .init()
        .await
        .context("Failed to prepare media directories")?;

    if cli_args.replace {
        let cleared = store.clear_songs()?;
        info!("Cleared {} existing songs", cleared);
    }

    let known_files: HashSet<String> = store
        .list_songs()?
        .into_iter()
        .map(|song| song.file)
        .collect();

    let mut names: Vec<String> = vault
        .snapshot_upload_names()
        .await
        .context("Failed to list uploads directory")?
        .into_iter()
        .collect();
    names.sort();

    let mut seeded = 0usize;
    let mut skipped = 0usize;

    for name in names {
        let file = public_audio_path(&name);
        if known_files.contains(&file) {
            skipped += 1;
            continue;
        }

        let path = vault.uploads_dir().join(&name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping unreadable file {:?}: {}", name, e);
                skipped += 1;
                continue;
            }
        };

        if !ingestion::sniff(&bytes).is_accepted() {
            warn!("Skipping {:?}: not a recognized audio file", name);
            skipped += 1;
            continue;
        }

        let tags = ingestion::extract(&bytes).unwrap_or_default();

        let base = name.strip_suffix(".mp3").unwrap_or(&name).to_string();
        let cover_art = match &tags.picture {
            None => DEFAULT_COVER_PATH.to_string(),
            Some(picture) => {
                let existing = vault.snapshot_cover_names().await?;
                let ext = ingestion::cover_extension(picture.mime.as_deref());
                let resolved = ingestion::allocate(&base, ext, &existing);
                match vault.write_cover(&resolved.filename, &picture.data).await {
                    Ok(_) => public_cover_path(&resolved.filename),
                    Err(e) => {
                        warn!("Cover art write failed for {:?}: {}", name, e);
                        DEFAULT_COVER_PATH.to_string()
                    }
                }
            }
        };

        let title = tags
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| ingestion::title_from_filename(&base));
        let artist = tags
            .artist
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| ingestion::DEFAULT_ARTIST.to_string());
        let album = tags.album.as_deref().unwrap_or("").trim().to_string();

        let song = store.create_song(&NewSong {
            title,
            artist,
            album,
            file,
            cover_art,
            duration: tags.duration_secs,
        })?;
        info!("Seeded {:?} from {:?}", song.title, name);
        seeded += 1;
    }

    info!("Done: {} seeded, {} skipped", seeded, skipped);
    Ok(())
}
