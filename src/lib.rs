pub mod api;
pub mod config;
pub mod services;
pub mod utils;

use crate::api::handlers;
use crate::config::ServiceConfig;
use crate::services::image_service::ImageService;
use crate::services::storage::LocalStorage;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::system::home,
        handlers::system::health_check,
        handlers::images::compress,
        handlers::images::convert,
        handlers::download::download,
    ),
    components(
        schemas(
            handlers::types::FileResponse,
            handlers::types::UploadForm,
            handlers::types::HealthResponse,
        )
    ),
    tags(
        (name = "images", description = "Image compression, conversion and download"),
        (name = "system", description = "Service endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub storage: Arc<LocalStorage>,
    pub images: Arc<ImageService>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let storage = Arc::new(LocalStorage::new(config.upload_dir.clone()));
        let images = Arc::new(ImageService::new(storage.clone()));
        Self {
            config,
            storage,
            images,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let max_upload_size = state.config.max_upload_size;

    Router::new()
        .route("/", get(handlers::system::home))
        .route("/health", get(handlers::system::health_check))
        .route("/api-docs/openapi.json", get(handlers::system::openapi_json))
        .route("/compress", post(handlers::images::compress))
        .route("/convert", post(handlers::images::convert))
        .route("/download", get(handlers::download::download))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(from_fn(api::middleware::cors::cors))
        .with_state(state)
}
