use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use game_registry_back::{
    config::PasswordHashingConfig,
    dao::registry_store::MemoryRegistryStore,
    routes,
    services::password::PasswordScheme,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn passwords() -> PasswordScheme {
    PasswordScheme::new(PasswordHashingConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

async fn app() -> Router {
    let state = AppState::with_store(passwords(), Arc::new(MemoryRegistryStore::new())).await;
    routes::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn server_lifecycle_over_http() {
    let app = app().await;

    let (status, _) = send_json(&app, "POST", "/game", json!({"name": "Doom"})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, "POST", "/game", json!({"name": "Doom"})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_json(
        &app,
        "POST",
        "/active_server",
        json!({"ip": "1.2.3.4", "port": 7777, "game_name": "Doom"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send_json(&app, "GET", "/active_server/Doom", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"address": "1.2.3.4", "port": 7777}]));

    let (status, _) = send_json(&app, "DELETE", "/active_server", json!({"id": id})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send_json(&app, "DELETE", "/active_server", json!({"id": id})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send_json(&app, "GET", "/active_server/Doom", Value::Null).await;
    assert_eq!(body, json!([]));

    let (status, body) = send_json(&app, "GET", "/active_server/NoSuchGame", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_announcement_is_a_bad_request() {
    let app = app().await;
    send_json(&app, "POST", "/game", json!({"name": "Doom"})).await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/active_server",
        json!({"ip": "not an address", "port": 7777, "game_name": "Doom"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "POST",
        "/active_server",
        json!({"ip": "1.2.3.4", "port": 7777, "game_name": "Quake"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_failures_share_one_response() {
    let app = app().await;
    let credentials = json!({"identifier": "alice", "password": "pw1"});

    let (status, registered) = send_json(&app, "POST", "/register", credentials.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, "POST", "/register", credentials.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, logged_in) = send_json(&app, "POST", "/login", credentials).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered["id"], logged_in["id"]);

    let wrong = send_json(
        &app,
        "POST",
        "/login",
        json!({"identifier": "alice", "password": "wrong"}),
    )
    .await;
    let unknown = send_json(
        &app,
        "POST",
        "/login",
        json!({"identifier": "bob", "password": "anything"}),
    )
    .await;
    assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn save_upload_and_download() {
    let app = app().await;
    send_json(&app, "POST", "/game", json!({"name": "Doom"})).await;
    let (_, user) = send_json(
        &app,
        "POST",
        "/register",
        json!({"identifier": "alice", "password": "pw1"}),
    )
    .await;
    let user_id = user["id"].as_i64().unwrap();

    let upload = |blob: &'static [u8]| {
        Request::builder()
            .method("POST")
            .uri("/save")
            .header("user-id", user_id.to_string())
            .header("game-name", "Doom")
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::from(blob))
            .unwrap()
    };

    let (status, _) = send(&app, upload(b"\x00\x01first")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, upload(b"\xffsecond")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let download = Request::builder()
        .method("POST")
        .uri("/get_save")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"id": user_id, "game": "Doom"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, download).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"\xffsecond");

    let (status, _) = send_json(&app, "POST", "/get_save", json!({"id": 999, "game": "Doom"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_upload_requires_headers() {
    let app = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/save")
        .header("game-name", "Doom")
        .body(Body::from("blob"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/save")
        .header("user-id", "alice")
        .header("game-name", "Doom")
        .body(Body::from("blob"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn degraded_state_reports_unavailable() {
    let app = routes::router(AppState::new(passwords()));

    let (status, body) = send_json(&app, "GET", "/healthcheck", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");

    let (status, _) = send_json(&app, "POST", "/game", json!({"name": "Doom"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
