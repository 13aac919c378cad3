use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::types::DownloadParams;
use crate::services::codec::ImageKind;
use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::io::ErrorKind;
use std::path::Path;
use tokio_util::io::ReaderStream;

fn content_type_for(path: &Path) -> mime::Mime {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| ImageKind::from_extension(&e.to_lowercase()))
        .map(ImageKind::mime)
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

#[utoipa::path(
    get,
    path = "/download",
    params(DownloadParams),
    responses(
        (status = 200, description = "File download stream"),
        (status = 400, description = "Missing or invalid file parameter"),
        (status = 404, description = "File not found")
    ),
    tag = "images"
)]
pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, AppError> {
    let requested = params.file.unwrap_or_default();
    if requested.is_empty() {
        return Err(AppError::BadRequest("Missing file parameter".to_string()));
    }

    let path = state
        .storage
        .resolve(&requested)
        .ok_or_else(|| AppError::BadRequest("Invalid file path".to_string()))?;

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(AppError::NotFound("File not found".to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()));
        }
        Err(e) => return Err(AppError::Internal(format!("Error reading file: {}", e))),
    };

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Error reading file: {}", e)))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&path).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
        (header::CONTENT_LENGTH, metadata.len().to_string()),
    ];

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((headers, body).into_response())
}
