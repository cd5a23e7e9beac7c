//! Catalog listing / programmatic create endpoint tests.

mod common;

use axum::{body::Body, http::Request};
use common::*;
use serde_json::json;
use tower::ServiceExt;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_starts_empty() {
    let server = make_test_server().await;

    let request = Request::builder()
        .uri("/api/songs")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await, json!([]));
}

#[tokio::test]
async fn test_programmatic_create_and_list_order() {
    let server = make_test_server().await;

    for title in ["First", "Second"] {
        let body = json!({
            "title": title,
            "artist": "Seeder",
            "file": format!("/uploads/{}.mp3", title),
            "duration": 42,
        });
        let response = server
            .app
            .clone()
            .oneshot(json_request("POST", "/api/songs", body))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let request = Request::builder()
        .uri("/api/songs")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    let json = response_json(response).await;

    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    // Defaults applied where the body was silent.
    assert_eq!(json[0]["coverArt"], "/coverArt/default.webp");
    assert_eq!(json[0]["album"], "");
}

#[tokio::test]
async fn test_programmatic_create_requires_title_and_file() {
    let server = make_test_server().await;

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({ "artist": "No Title" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Title and file are required");

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({ "title": "  ", "file": "/uploads/x.mp3" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_get_single_song() {
    let server = make_test_server().await;

    let response = server
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/songs",
            json!({ "title": "Solo", "file": "/uploads/solo.mp3" }),
        ))
        .await
        .unwrap();
    let created = response_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let request = Request::builder()
        .uri(format!("/api/songs/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await["title"], "Solo");

    let request = Request::builder()
        .uri("/api/songs/999999")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_uploaded_song_appears_in_listing() {
    let server = make_test_server().await;

    let bytes = Mp3Fixture {
        title: Some("Listed"),
        ..Default::default()
    }
    .build();
    let response = server
        .app
        .clone()
        .oneshot(multipart_upload("file", "listed.mp3", "audio/mpeg", &bytes))
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let request = Request::builder()
        .uri("/api/songs")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    let json = response_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["title"], "Listed");
}
