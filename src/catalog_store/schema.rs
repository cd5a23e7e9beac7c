//! Database schema for the song catalog.

/// SQL schema for the catalog database.
pub const SONGS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    artist TEXT NOT NULL DEFAULT '',
    album TEXT NOT NULL DEFAULT '',

    -- Canonical public paths, as served to clients
    file TEXT NOT NULL,
    cover_art TEXT NOT NULL DEFAULT '',

    duration INTEGER NOT NULL DEFAULT 0,

    -- Unix milliseconds
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_songs_created_at ON songs(created_at DESC);
"#;
