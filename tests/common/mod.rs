//! Shared helpers for end-to-end tests: synthetic MP3 fixtures, multipart
//! request building and an app wired to a temp sandbox.
#![allow(dead_code)]

use axum::{body::Body, http::Request, Router};
use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, Tag, TagExt, TagType};
use std::sync::Arc;
use tempfile::TempDir;

use frequency_server::catalog_store::SqliteSongStore;
use frequency_server::ingestion::{IngestionPipeline, MediaVault};
use frequency_server::{make_app, ServerConfig, ServerState};

// One CBR MPEG-1 Layer III frame: 128 kbps, 44.1 kHz, no padding.
pub const FRAME_LEN: usize = 417;
pub const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];

/// Frame count whose estimated playback length lands on three seconds.
pub const FRAMES_3_SECS: usize = 115;

/// Frame count whose estimated playback length lands on three minutes.
pub const FRAMES_180_SECS: usize = 6900;

pub fn cbr_frames(count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count * FRAME_LEN);
    for _ in 0..count {
        out.extend_from_slice(&FRAME_HEADER);
        out.extend(std::iter::repeat(0u8).take(FRAME_LEN - FRAME_HEADER.len()));
    }
    out
}

pub struct Mp3Fixture {
    pub title: Option<&'static str>,
    pub artist: Option<&'static str>,
    pub album: Option<&'static str>,
    pub picture: Option<Vec<u8>>,
    pub frames: usize,
}

impl Default for Mp3Fixture {
    fn default() -> Self {
        Self {
            title: None,
            artist: None,
            album: None,
            picture: None,
            frames: FRAMES_3_SECS,
        }
    }
}

impl Mp3Fixture {
    pub fn build(self) -> Vec<u8> {
        let mut buf = Vec::new();

        let tagged = self.title.is_some()
            || self.artist.is_some()
            || self.album.is_some()
            || self.picture.is_some();
        if tagged {
            let mut tag = Tag::new(TagType::Id3v2);
            if let Some(title) = self.title {
                tag.set_title(title.to_string());
            }
            if let Some(artist) = self.artist {
                tag.set_artist(artist.to_string());
            }
            if let Some(album) = self.album {
                tag.set_album(album.to_string());
            }
            if let Some(data) = self.picture {
                tag.push_picture(Picture::new_unchecked(
                    PictureType::CoverFront,
                    Some(MimeType::Png),
                    None,
                    data,
                ));
            }
            tag.dump_to(&mut buf, WriteOptions::default()).unwrap();
        }

        buf.extend_from_slice(&cbr_frames(self.frames));
        buf
    }
}

pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
    b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
];

pub struct TestServer {
    pub app: Router,
    pub store: Arc<SqliteSongStore>,
    pub tmp: TempDir,
}

impl TestServer {
    pub fn uploads_dir(&self) -> std::path::PathBuf {
        self.tmp.path().join("uploads")
    }

    pub fn covers_dir(&self) -> std::path::PathBuf {
        self.tmp.path().join("coverArt")
    }

    pub fn upload_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.uploads_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub async fn make_test_server() -> TestServer {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(SqliteSongStore::new(&tmp.path().join("catalog.db")).unwrap());
    let vault = MediaVault::new(tmp.path().join("uploads"), tmp.path().join("coverArt"));
    vault.init().await.unwrap();
    let pipeline = Arc::new(IngestionPipeline::new(vault, store.clone()));
    let state = ServerState::new(ServerConfig::default(), store.clone(), pipeline);

    TestServer {
        app: make_app(state),
        store,
        tmp,
    }
}

pub const MULTIPART_BOUNDARY: &str = "X-FREQUENCY-TEST-BOUNDARY";

/// Build a multipart upload request carrying one file field.
pub fn multipart_upload(
    field_name: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field_name, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
