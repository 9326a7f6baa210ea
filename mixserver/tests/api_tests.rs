//! HTTP tests of the generation API

use std::collections::HashSet;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use mixplaylist::PlaylistClient;
use mixserver::api::{MESSAGE_NO_KEY, MESSAGE_SEARCH_OK, create_router};
use mixserver::catalog::sample_songs;
use mixserver::{GenerateResponse, GenerateState, MixtapeApiExt, Server, YoutubeSearch};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn generate(router: Router, body: Value) -> GenerateResponse {
    let (status, bytes) = send(router, post_json("/api/generate-playlist", body)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

fn youtube_items() -> Value {
    json!({
        "items": [
            {
                "id": { "kind": "youtube#video", "videoId": "hTWKbfoikeg" },
                "snippet": {
                    "title": "Nirvana - Smells Like Teen Spirit",
                    "channelTitle": "NirvanaVEVO",
                    "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/hTWKbfoikeg/mqdefault.jpg" } }
                }
            },
            {
                "id": { "kind": "youtube#video", "videoId": "3mbBbFH9fAg" },
                "snippet": {
                    "title": "Soundgarden - Black Hole Sun",
                    "channelTitle": "SoundgardenVEVO",
                    "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/3mbBbFH9fAg/mqdefault.jpg" } }
                }
            },
            {
                "id": { "kind": "youtube#video", "videoId": "6Ejga4kJUts" },
                "snippet": {
                    "title": "The Cranberries - Zombie",
                    "channelTitle": "TheCranberriesVEVO",
                    "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/6Ejga4kJUts/mqdefault.jpg" } }
                }
            }
        ]
    })
}

fn search_state(server: &MockServer) -> GenerateState {
    let search = YoutubeSearch::new("test-key")
        .unwrap()
        .with_api_url(format!("{}/youtube/v3/search", server.uri()));
    GenerateState::new(Some(search))
}

#[tokio::test]
async fn test_api_banner() {
    for uri in ["/", "/api", "/api/"] {
        let (status, bytes) = send(create_router(GenerateState::offline()), get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Mixtape Generator API");
    }
}

#[tokio::test]
async fn test_offline_generation_uses_catalogue() {
    let router = create_router(GenerateState::offline());
    let response = generate(router, json!({ "theme": "grunge" })).await;

    assert_eq!(response.message, MESSAGE_NO_KEY);
    assert_eq!(response.playlist.len(), 10);

    let catalogue: HashSet<String> = sample_songs().into_iter().map(|s| s.video_id).collect();
    let ids: HashSet<String> = response.playlist.iter().map(|s| s.video_id.clone()).collect();
    assert_eq!(ids.len(), 10);
    assert!(ids.is_subset(&catalogue));
}

#[tokio::test]
async fn test_count_is_honoured_and_clamped() {
    let response = generate(
        create_router(GenerateState::offline()),
        json!({ "theme": "pop", "count": 3 }),
    )
    .await;
    assert_eq!(response.playlist.len(), 3);

    let response = generate(
        create_router(GenerateState::offline()),
        json!({ "theme": "pop", "count": 40 }),
    )
    .await;
    assert_eq!(response.playlist.len(), 15);
}

#[tokio::test]
async fn test_blank_theme_is_bad_request() {
    let (status, bytes) = send(
        create_router(GenerateState::offline()),
        post_json("/api/generate-playlist", json!({ "theme": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_theme_is_rejected() {
    let (status, _) = send(
        create_router(GenerateState::offline()),
        post_json("/api/generate-playlist", json!({ "count": 10 })),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_search_results_are_mapped() {
    let youtube = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("q", "90s music grunge"))
        .and(query_param("part", "snippet"))
        .and(query_param("type", "video"))
        .and(query_param("videoEmbeddable", "true"))
        .and(query_param("maxResults", "50"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(youtube_items()))
        .expect(1)
        .mount(&youtube)
        .await;

    let response = generate(
        create_router(search_state(&youtube)),
        json!({ "theme": "GRUNGE", "count": 2 }),
    )
    .await;

    assert_eq!(response.message, MESSAGE_SEARCH_OK);
    assert_eq!(response.playlist.len(), 2);
    assert_eq!(response.playlist[0].video_id, "hTWKbfoikeg");
    assert_eq!(response.playlist[0].artist, "NirvanaVEVO");
    assert_eq!(
        response.playlist[1].thumbnail,
        "https://i.ytimg.com/vi/3mbBbFH9fAg/mqdefault.jpg"
    );
}

#[tokio::test]
async fn test_search_failure_falls_back_to_catalogue() {
    let youtube = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
        .mount(&youtube)
        .await;

    let response = generate(
        create_router(search_state(&youtube)),
        json!({ "theme": "dance" }),
    )
    .await;

    assert!(
        response
            .message
            .starts_with("Using sample 90s playlist (API error:")
    );
    assert!(response.message.contains("403"));
    assert!(!response.message.contains("test-key"));
    assert_eq!(response.playlist.len(), 10);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let mut server = Server::new("Test", "127.0.0.1", 0);
    server
        .init_mixtape_api_with(GenerateState::offline())
        .await
        .unwrap();

    let (status, bytes) = send(server.router().await, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(doc["paths"]["/api/generate-playlist"]["post"].is_object());
    assert!(doc["paths"]["/api/log_setup"]["get"].is_object());
}

#[tokio::test]
async fn test_playlist_client_against_running_server() {
    let mut server = Server::new("Test", "127.0.0.1", 0);
    server
        .init_mixtape_api_with(GenerateState::offline())
        .await
        .unwrap();
    server.start().await.unwrap();
    let port = server.local_addr().unwrap().port();

    let client = PlaylistClient::builder()
        .api_base(format!("http://127.0.0.1:{}/api", port))
        .build()
        .unwrap();
    let playlist = client.generate("grunge", 10).await.unwrap();

    assert_eq!(playlist.len(), 10);
    assert_eq!(playlist.theme(), "grunge");
    assert_eq!(playlist.message(), Some(MESSAGE_NO_KEY));
    assert!(
        playlist
            .iter()
            .all(|t| t.thumbnail_url().starts_with("https://i.ytimg.com/vi/"))
    );

    server.stop();
}
