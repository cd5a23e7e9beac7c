//! Upload HTTP route.
//!
//! `POST /upload` accepts a multipart form with a single `file` field and
//! runs it through the ingestion pipeline. Validation errors (missing file,
//! rejected type) map to 4xx responses before any write; storage and catalog
//! failures map to a generic 500 so clients can tell "your input was bad"
//! from "the server could not complete the operation".

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::catalog_store::SongStore;
use crate::ingestion::{DetectedType, IngestError, UploadRequest};
use crate::server::metrics::{record_upload, set_songs_count};
use crate::server::state::ServerState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detected: Option<Option<DetectedType>>,
}

fn plain_error(error: &str) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        detected: None,
    }
}

/// POST /upload - Validate, extract and store one audio file (multipart/form-data)
async fn upload_song(State(state): State<ServerState>, mut multipart: Multipart) -> Response {
    let mut filename: Option<String> = None;
    let mut declared_mime: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }

        filename = field.file_name().map(|s| s.to_string());
        declared_mime = field.content_type().map(|s| s.to_string());
        match field.bytes().await {
            Ok(bytes) => data = Some(bytes.to_vec()),
            Err(e) => {
                warn!("Failed to read upload field: {}", e);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(plain_error("Failed to read file")),
                )
                    .into_response();
            }
        }
    }

    let (filename, data) = match (filename, data) {
        (Some(f), Some(d)) if !f.is_empty() => (f, d),
        _ => {
            record_upload("missing_input");
            return error_response(&IngestError::MissingInput);
        }
    };

    let declared_filename = filename.clone();
    let upload = UploadRequest {
        bytes: data,
        declared_filename: filename,
        declared_mime,
    };

    match state.pipeline.ingest(upload).await {
        Ok(song) => {
            record_upload("created");
            set_songs_count(state.song_store.songs_count());
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Upload and save successful",
                    "song": song,
                })),
            )
                .into_response()
        }
        Err(err) => {
            record_upload(match &err {
                IngestError::RejectedType { .. } => "rejected_type",
                IngestError::MissingInput => "missing_input",
                _ => "failed",
            });
            if matches!(
                err,
                IngestError::Storage(_) | IngestError::Persistence(_)
            ) {
                warn!("Upload of {:?} failed: {}", declared_filename, err);
            }
            error_response(&err)
        }
    }
}

fn error_response(err: &IngestError) -> Response {
    match err {
        IngestError::MissingInput => (
            StatusCode::BAD_REQUEST,
            Json(plain_error("No file uploaded")),
        )
            .into_response(),
        IngestError::RejectedType { verdict } => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(ErrorResponse {
                error: "Invalid file type. Expected an MP3.".to_string(),
                detected: Some(verdict.detected),
            }),
        )
            .into_response(),
        IngestError::Storage(_) | IngestError::Persistence(_) => {
            // Details stay in the logs; the body never leaks internal paths.
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(plain_error("Upload failed")),
            )
                .into_response()
        }
    }
}

/// Build the upload routes.
pub fn upload_routes(max_upload_size_mb: usize) -> Router<ServerState> {
    Router::new()
        .route("/upload", post(upload_song))
        .layer(DefaultBodyLimit::max(max_upload_size_mb * 1024 * 1024))
}
