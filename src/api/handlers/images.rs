use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::types::{CompressParams, FileResponse, UploadForm};
use crate::config::ServiceConfig;
use crate::services::image_service::{ImageUpload, ProcessError};
use crate::utils::validation::{clamp_level, file_extension, parse_level, supported_kind};
use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartError, multipart::MultipartRejection},
    http::StatusCode,
};
use bytes::Bytes;

/// Form field carrying the image.
const UPLOAD_FIELD: &str = "upload";

struct RawUpload {
    filename: String,
    data: Bytes,
}

fn form_error(err: MultipartError, config: &ServiceConfig) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BadRequest(format!(
            "Please upload file below {} MB",
            config.max_upload_size_mb()
        ))
    } else {
        tracing::warn!("Malformed multipart body: {}", err.body_text());
        AppError::BadRequest("Invalid multipart form".to_string())
    }
}

/// Reads the whole form and keeps the first `upload` file part.
///
/// Every part is consumed so an oversized body is rejected even when the image
/// itself comes first.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    config: &ServiceConfig,
) -> Result<RawUpload, AppError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("Rejected form: {}", e.body_text());
        AppError::BadRequest("Invalid multipart form".to_string())
    })?;

    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, config))?
    {
        // a browser sends `filename=""` when no file was picked
        let is_upload = field.name() == Some(UPLOAD_FIELD)
            && field.file_name().is_some_and(|name| !name.is_empty());
        if !is_upload || upload.is_some() {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| form_error(e, config))?;
        upload = Some(RawUpload { filename, data });
    }

    upload.ok_or_else(|| AppError::BadRequest("Error reading the file".to_string()))
}

fn process_error(err: ProcessError, action: &str) -> AppError {
    match err {
        ProcessError::StoreOriginal(e) => {
            tracing::error!("Storing original failed: {:#}", e);
            AppError::Internal("Error saving file".to_string())
        }
        ProcessError::Decode(e) => {
            tracing::error!("{}", e);
            AppError::Internal("Error opening image".to_string())
        }
        ProcessError::Encode(e) => AppError::Internal(format!("{}: {}", action, e)),
        ProcessError::StoreDerivative(e) => AppError::Internal(format!("{}: {:#}", action, e)),
        ProcessError::Task(e) => AppError::Internal(format!("{}: {}", action, e)),
    }
}

#[utoipa::path(
    post,
    path = "/compress",
    params(CompressParams),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image re-encoded", body = FileResponse),
        (status = 400, description = "Invalid upload, level or format"),
        (status = 500, description = "Storage or codec failure")
    ),
    tag = "images"
)]
pub async fn compress(
    State(state): State<AppState>,
    Query(params): Query<CompressParams>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FileResponse>, AppError> {
    let raw = read_upload(multipart, &state.config).await?;

    let extension = file_extension(&raw.filename)?;
    let level = parse_level(params.level.as_deref())?;
    let kind = supported_kind(&extension)?;
    let options = clamp_level(kind, level);

    let upload = ImageUpload {
        extension,
        kind,
        data: raw.data,
    };

    let processed = state
        .images
        .compress(upload, options)
        .await
        .map_err(|e| process_error(e, "Error saving compressed image"))?;
    tracing::info!("Compressed into {} ({})", processed.file, processed.kind.mime());

    Ok(Json(FileResponse {
        file: processed.file,
    }))
}

#[utoipa::path(
    post,
    path = "/convert",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PNG converted to JPEG or JPEG to PNG", body = FileResponse),
        (status = 400, description = "Invalid upload or format"),
        (status = 500, description = "Storage or codec failure")
    ),
    tag = "images"
)]
pub async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FileResponse>, AppError> {
    let raw = read_upload(multipart, &state.config).await?;

    let extension = file_extension(&raw.filename)?;
    let kind = supported_kind(&extension)?;

    let upload = ImageUpload {
        extension,
        kind,
        data: raw.data,
    };

    let processed = state
        .images
        .convert(upload)
        .await
        .map_err(|e| process_error(e, "Error saving converted image"))?;
    tracing::info!("Converted into {} ({})", processed.file, processed.kind.mime());

    Ok(Json(FileResponse {
        file: processed.file,
    }))
}
