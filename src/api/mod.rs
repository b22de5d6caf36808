//! API handlers for the library REST endpoints

pub mod books;
pub mod openapi;
pub mod root;

use axum::{
    async_trait,
    body::{Body, Bytes},
    extract::{rejection::JsonRejection, FromRequest, Request},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// An empty body, or one not declared as JSON, reads as `{}`
fn empty_object<T: DeserializeOwned>() -> Result<T, AppError> {
    serde_json::from_value(Value::Object(Map::new()))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// JSON body extractor whose rejections use the API error shape
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = Bytes::from_request(Request::new(body), state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.is_empty() {
            return empty_object().map(JsonBody);
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => empty_object().map(JsonBody),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let books = Router::new()
        .route(
            "/api/books",
            get(books::get_book_without_id).post(books::create_book),
        )
        // Non-strict matching of the collection path
        .route(
            "/api/books/",
            get(books::get_book_without_id).post(books::create_book),
        )
        .route(
            "/api/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .with_state(state);

    Router::new()
        .route("/", get(root::welcome))
        .merge(books)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
