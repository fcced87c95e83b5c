mod common;

use axum::{
    Router,
    http::{StatusCode, header},
    routing::get,
};
use axum_test::TestServer;
use url_watch::api::handlers::{delete_entry_handler, get_entry_handler, redirect_handler};
use url_watch::state::AppState;

fn server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/{id}", get(redirect_handler))
        .route(
            "/api/{id}",
            get(get_entry_handler).delete(delete_entry_handler),
        )
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_get_entry_success() {
    let state = common::create_test_state();
    let entry = state
        .entry_service
        .create_entry("https://example.com/a")
        .await
        .unwrap();
    let server = server(state);

    let response = server.get(&format!("/api/{}", entry.id)).await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["id"], entry.id.as_str());
    assert_eq!(json["url"], "https://example.com/a");
}

#[tokio::test]
async fn test_get_entry_not_found() {
    let server = server(common::create_test_state());

    let response = server.get("/api/zzz999").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "not_found"
    );
}

#[tokio::test]
async fn test_get_entry_malformed_id() {
    let server = server(common::create_test_state());

    let response = server.get("/api/not-an-id").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let too_long = "a".repeat(21);
    let response = server.get(&format!("/api/{}", too_long)).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redirect_success() {
    let state = common::create_test_state();
    let entry = state
        .entry_service
        .create_entry("example.com/target")
        .await
        .unwrap();
    let server = server(state);

    let response = server.get(&format!("/{}", entry.id)).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header(header::LOCATION),
        "https://example.com/target"
    );
}

#[tokio::test]
async fn test_redirect_not_found() {
    let server = server(common::create_test_state());

    let response = server.get("/abc123").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_entry() {
    let state = common::create_test_state();
    let entry = state
        .entry_service
        .create_entry("https://example.com/doomed")
        .await
        .unwrap();
    let server = server(state.clone());

    let response = server.delete(&format!("/api/{}", entry.id)).await;
    response.assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/{}", entry.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/{}", entry.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert!(
        !state
            .entry_service
            .contains_url("https://example.com/doomed")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_delete_nonexistent_entry() {
    let server = server(common::create_test_state());

    let response = server.delete("/api/zzz999").await;

    response.assert_status(StatusCode::NO_CONTENT);
}
