use crate::AppState;
use crate::api::handlers::types::HealthResponse;
use axum::{Json, extract::State, response::IntoResponse};
use utoipa::OpenApi;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = String, content_type = "text/plain")
    ),
    tag = "system"
)]
pub async fn home() -> &'static str {
    "Welcome to our application"
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        upload_dir: state.storage.root().display().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(crate::ApiDoc::openapi())
}
