//! In-process API tests against the in-memory store

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_server::{
    api,
    repository::{DisconnectedStore, InMemoryBookStore, Repository},
    AppState,
};

fn app_with(repository: Repository) -> Router {
    api::create_router(AppState::new(repository))
}

fn app() -> Router {
    app_with(Repository::in_memory())
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, bytes.to_vec())
}

fn parse(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).expect("Failed to parse response")
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let (status, bytes) = send_raw(app, request).await;
    (status, parse(&bytes))
}

/// Send a body without declaring it as JSON
async fn send_untyped(
    app: &Router,
    method: Method,
    uri: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();

    let (status, bytes) = send_raw(app, request).await;
    (status, parse(&bytes))
}

fn book_uri(id: &str) -> String {
    format!("/api/books/{id}")
}

fn dune() -> Value {
    json!({
        "title": "Dune",
        "author": "Herbert",
        "genre": "SciFi",
        "availableCopies": 3
    })
}

async fn create(app: &Router, body: Value) -> String {
    let (status, created) = send(app, Method::POST, "/api/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created["id"].as_str().expect("No book ID").to_string()
}

const UNKNOWN_ID: &str = "65f1c2a9e4b0a1b2c3d4e5f6";

#[tokio::test]
async fn test_root_returns_welcome_text() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, bytes) = send_raw(&app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "Welcome to the Library Management API"
    );
}

#[tokio::test]
async fn test_root_ignores_database_state() {
    let app = app_with(Repository::new(Arc::new(DisconnectedStore)));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &book_uri(UNKNOWN_ID), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_book_lifecycle() {
    let app = app();

    let (status, created) = send(&app, Method::POST, "/api/books", Some(dune())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("No book ID").to_string();
    assert_eq!(
        created,
        json!({
            "id": id.as_str(),
            "title": "Dune",
            "author": "Herbert",
            "genre": "SciFi",
            "availableCopies": 3,
            "borrowedBy": []
        })
    );

    let (status, fetched) = send(&app, Method::GET, &book_uri(&id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &book_uri(&id),
        Some(json!({"availableCopies": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["availableCopies"], 2);
    assert_eq!(updated["title"], "Dune");
    assert_eq!(updated["author"], "Herbert");
    assert_eq!(updated["genre"], "SciFi");
    assert_eq!(updated["id"], id.as_str());

    let (status, body) = send(&app, Method::DELETE, &book_uri(&id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Book deleted successfully"}));

    let (status, body) = send(&app, Method::GET, &book_uri(&id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_create_with_missing_fields_persists_nothing() {
    let store = Arc::new(InMemoryBookStore::new());
    let app = app_with(Repository::new(store.clone()));

    let payloads = [
        json!({"author": "Herbert", "genre": "SciFi", "availableCopies": 3}),
        json!({"title": "Dune", "genre": "SciFi", "availableCopies": 3}),
        json!({"title": "Dune", "author": "Herbert", "genre": "", "availableCopies": 3}),
        json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}),
        json!({"title": "Dune", "author": "Herbert", "genre": "SciFi", "availableCopies": null}),
        json!({"availableCopies": "abc"}),
        json!({"title": "Dune", "genre": "SciFi", "publishedYear": "n/a", "availableCopies": 3}),
        json!({}),
    ];

    for payload in payloads {
        let (status, body) = send(&app, Method::POST, "/api/books", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing required fields"}));
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_create_accepts_zero_copies() {
    let app = app();
    let mut payload = dune();
    payload["availableCopies"] = json!(0);

    let (status, body) = send(&app, Method::POST, "/api/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["availableCopies"], 0);
}

#[tokio::test]
async fn test_create_keeps_published_year() {
    let app = app();
    let mut payload = dune();
    payload["publishedYear"] = json!(1965);

    let id = create(&app, payload).await;
    let (_, body) = send(&app, Method::GET, &book_uri(&id), None).await;
    assert_eq!(body["publishedYear"], 1965);
}

#[tokio::test]
async fn test_create_with_uncastable_copies_is_server_error() {
    let store = Arc::new(InMemoryBookStore::new());
    let app = app_with(Repository::new(store.clone()));
    let mut payload = dune();
    payload["availableCopies"] = json!("plenty");

    let (status, body) = send(&app, Method::POST, "/api/books", Some(payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_create_casts_scalar_text_fields() {
    let app = app();
    let payload = json!({
        "title": 1984,
        "author": "Orwell",
        "genre": "Dystopia",
        "availableCopies": 1
    });

    let (status, body) = send(&app, Method::POST, "/api/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "1984");
    assert_eq!(body["availableCopies"], 1);
}

#[tokio::test]
async fn test_create_with_uncastable_year_is_server_error() {
    let store = Arc::new(InMemoryBookStore::new());
    let app = app_with(Repository::new(store.clone()));
    let mut payload = dune();
    payload["publishedYear"] = json!("n/a");

    let (status, body) = send(&app, Method::POST, "/api/books", Some(payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_create_without_json_content_type_is_missing_fields() {
    let store = Arc::new(InMemoryBookStore::new());
    let app = app_with(Repository::new(store.clone()));

    let (status, body) =
        send_untyped(&app, Method::POST, "/api/books", &dune().to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing required fields"}));

    let (status, _) = send(&app, Method::POST, "/api/books", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_update_without_json_content_type_returns_current_record() {
    let app = app();
    let id = create(&app, dune()).await;

    let (status, body) =
        send_untyped(&app, Method::PUT, &book_uri(&id), r#"{"availableCopies": 9}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availableCopies"], 3);

    let (status, body) = send(&app, Method::PUT, &book_uri(&id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Dune");
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/books")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let (status, bytes) = send_raw(&app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Invalid JSON body"}));
}

#[tokio::test]
async fn test_get_unknown_book_is_not_found() {
    let (status, body) = send(&app(), Method::GET, &book_uri(UNKNOWN_ID), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_get_without_id_does_not_list() {
    let app = app();
    create(&app, dune()).await;

    let (status, body) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_trailing_slash_matches_collection_path() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/books/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));

    let (status, _) = send(&app, Method::POST, "/api/books/", Some(dune())).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_id_is_server_error() {
    let app = app();

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/api/books/not-an-id", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/books/not-an-id",
        Some(json!({"title": "Emma"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_update_unknown_book_creates_nothing() {
    let store = Arc::new(InMemoryBookStore::new());
    let app = app_with(Repository::new(store.clone()));

    let (status, body) = send(
        &app,
        Method::PUT,
        &book_uri(UNKNOWN_ID),
        Some(dune()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_update_with_empty_body_returns_current_record() {
    let app = app();
    let id = create(&app, dune()).await;

    let (status, body) = send(&app, Method::PUT, &book_uri(&id), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Dune");
    assert_eq!(body["availableCopies"], 3);
}

#[tokio::test]
async fn test_update_ignores_unknown_fields_and_identifier() {
    let app = app();
    let id = create(&app, dune()).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &book_uri(&id),
        Some(json!({"id": UNKNOWN_ID, "shelf": "B4", "genre": "Classic"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["genre"], "Classic");
    assert!(body.get("shelf").is_none());
}

#[tokio::test]
async fn test_delete_unknown_book_is_not_found() {
    let app = app();
    let id = create(&app, dune()).await;

    let (status, _) = send(&app, Method::DELETE, &book_uri(&id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, &book_uri(&id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_concurrent_disjoint_updates_both_apply() {
    let app = app();
    let id = create(&app, dune()).await;
    let uri = book_uri(&id);

    let (first, second) = tokio::join!(
        send(&app, Method::PUT, &uri, Some(json!({"availableCopies": 7}))),
        send(&app, Method::PUT, &uri, Some(json!({"genre": "Classic"}))),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["availableCopies"], 7);
    assert_eq!(body["genre"], "Classic");
    assert_eq!(body["title"], "Dune");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/books/{id}"].is_object());
}
