//! Root endpoint

pub const WELCOME: &str = "Welcome to the Library Management API";

/// Static welcome text; never touches the database
#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses(
        (status = 200, description = "Welcome message", body = String, content_type = "text/plain")
    )
)]
pub async fn welcome() -> &'static str {
    WELCOME
}
