//! Song catalog persistence.

mod models;
mod schema;
mod store;

pub use models::{NewSong, Song};
pub use schema::SONGS_SCHEMA_SQL;
pub use store::{SongStore, SqliteSongStore};
