//! SQLite-backed song catalog.

use super::models::{NewSong, Song};
use super::schema::SONGS_SCHEMA_SQL;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Storage backend for catalog records.
///
/// The ingestion pipeline only ever calls `create_song`; the read operations
/// back the listing endpoints.
pub trait SongStore: Send + Sync {
    /// Create one record. Assigns id and creation time.
    fn create_song(&self, song: &NewSong) -> Result<Song>;

    /// Get a record by id.
    fn get_song(&self, id: i64) -> Result<Option<Song>>;

    /// All records, newest first.
    fn list_songs(&self) -> Result<Vec<Song>>;

    /// Number of records, for metrics.
    fn songs_count(&self) -> usize;

    /// Remove every record, returning how many were deleted.
    fn clear_songs(&self) -> Result<usize>;
}

/// SQLite implementation of [`SongStore`].
pub struct SqliteSongStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSongStore {
    /// Open (or create) the catalog database at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        conn.execute_batch(SONGS_SCHEMA_SQL)
            .context("Failed to create catalog schema")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
            .unwrap_or(0);
        info!("Opened song catalog at {:?}: {} songs", db_path, count);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn row_to_song(row: &Row) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        album: row.get(3)?,
        file: row.get(4)?,
        cover_art: row.get(5)?,
        duration: row.get::<_, i64>(6)?.max(0) as u64,
        created_at: row.get(7)?,
    })
}

const SONG_COLUMNS: &str = "id, title, artist, album, file, cover_art, duration, created_at";

impl SongStore for SqliteSongStore {
    fn create_song(&self, song: &NewSong) -> Result<Song> {
        let created_at = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO songs (title, artist, album, file, cover_art, duration, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                song.title,
                song.artist,
                song.album,
                song.file,
                song.cover_art,
                song.duration as i64,
                created_at,
            ],
        )
        .context("Failed to insert song")?;

        let id = conn.last_insert_rowid();
        Ok(Song {
            id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album.clone(),
            file: song.file.clone(),
            cover_art: song.cover_art.clone(),
            duration: song.duration,
            created_at,
        })
    }

    fn get_song(&self, id: i64) -> Result<Option<Song>> {
        let conn = self.conn.lock().unwrap();
        let song = conn
            .query_row(
                &format!("SELECT {} FROM songs WHERE id = ?1", SONG_COLUMNS),
                params![id],
                row_to_song,
            )
            .optional()
            .context("Failed to query song")?;
        Ok(song)
    }

    fn list_songs(&self) -> Result<Vec<Song>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM songs ORDER BY created_at DESC, id DESC",
            SONG_COLUMNS
        ))?;
        let songs = stmt
            .query_map([], row_to_song)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list songs")?;
        Ok(songs)
    }

    fn songs_count(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    fn clear_songs(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM songs", [])
            .context("Failed to clear songs")?;
        Ok(deleted)
    }
}
