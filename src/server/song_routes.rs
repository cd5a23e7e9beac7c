//! Catalog listing and programmatic-create routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::catalog_store::{NewSong, SongStore};
use crate::ingestion::DEFAULT_COVER_PATH;
use crate::server::metrics::set_songs_count;
use crate::server::state::{GuardedSongStore, ServerState};

/// GET / - All songs, newest first
async fn list_songs(State(store): State<GuardedSongStore>) -> Response {
    match store.list_songs() {
        Ok(songs) => Json(songs).into_response(),
        Err(e) => {
            warn!("Failed to fetch songs: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch songs" })),
            )
                .into_response()
        }
    }
}

/// GET /{id} - One song by id
async fn get_song(State(store): State<GuardedSongStore>, Path(id): Path<i64>) -> Response {
    match store.get_song(id) {
        Ok(Some(song)) => Json(song).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Failed to fetch song {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch song" })),
            )
                .into_response()
        }
    }
}

/// Body of a JSON-based create. Bypasses file validation; meant for
/// programmatic imports of assets that are already in place.
#[derive(Debug, Deserialize)]
struct CreateSongBody {
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
    file: Option<String>,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(default, rename = "coverArt")]
    cover_art: Option<String>,
}

/// POST / - JSON-based create
async fn create_song(
    State(store): State<GuardedSongStore>,
    Json(body): Json<CreateSongBody>,
) -> Response {
    let title = body.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let file = body.file.map(|f| f.trim().to_string()).unwrap_or_default();
    if title.is_empty() || file.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Title and file are required" })),
        )
            .into_response();
    }

    let cover_art = body
        .cover_art
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COVER_PATH.to_string());

    let new_song = NewSong {
        title,
        artist: body.artist.unwrap_or_default().trim().to_string(),
        album: body.album.unwrap_or_default().trim().to_string(),
        file,
        cover_art,
        duration: body.duration.unwrap_or(0),
    };

    match store.create_song(&new_song) {
        Ok(song) => {
            set_songs_count(store.songs_count());
            (StatusCode::CREATED, Json(song)).into_response()
        }
        Err(e) => {
            warn!("Failed to save song: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to save song" })),
            )
                .into_response()
        }
    }
}

/// Build the songs routes.
pub fn song_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_songs).post(create_song))
        .route("/{id}", get(get_song))
}
