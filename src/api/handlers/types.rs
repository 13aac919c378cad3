use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Reference to a processed file, relative to the upload root.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponse {
    /// Pass this value as `file` to `/download`
    #[schema(example = "processed/5b1e4c7a-2f0d-3a8e-9c61-0d4f7b2e8a13.png")]
    pub file: String,
}

/// Multipart body accepted by `/compress` and `/convert`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// PNG or JPEG image, at most 10 MB
    #[schema(value_type = String, format = Binary)]
    pub upload: Vec<u8>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompressParams {
    /// PNG: compression level clamped to 0..=3. JPEG: quality clamped to 1..=100.
    pub level: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadParams {
    /// Path returned by `/compress` or `/convert`
    pub file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub upload_dir: String,
    pub version: String,
}
