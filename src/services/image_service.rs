use crate::services::codec::{self, CodecError, EncodeOptions, ImageKind};
use crate::services::identifier;
use crate::services::storage::LocalStorage;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::info;

/// A validated upload ready for processing.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Lowercase extension of the uploaded filename, without the dot
    pub extension: String,
    pub kind: ImageKind,
    pub data: Bytes,
}

/// Where a derivative ended up.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub path: PathBuf,
    /// Path relative to the upload root, as served by `/download`
    pub file: String,
    pub kind: ImageKind,
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to store original: {0:#}")]
    StoreOriginal(anyhow::Error),

    #[error(transparent)]
    Decode(CodecError),

    #[error(transparent)]
    Encode(CodecError),

    #[error("failed to store derivative: {0:#}")]
    StoreDerivative(anyhow::Error),

    #[error("codec task failed: {0}")]
    Task(#[from] JoinError),
}

impl From<CodecError> for ProcessError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(_) => Self::Decode(err),
            CodecError::Encode(_) => Self::Encode(err),
        }
    }
}

/// Compress and convert pipelines on top of [`LocalStorage`].
pub struct ImageService {
    storage: Arc<LocalStorage>,
}

impl ImageService {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    /// Stores the original and re-encodes it in its own format.
    ///
    /// The derivative name is derived from the original's identifier and keeps
    /// the uploaded extension.
    pub async fn compress(
        &self,
        upload: ImageUpload,
        options: EncodeOptions,
    ) -> Result<ProcessedImage, ProcessError> {
        let id = identifier::new_original_id();
        let original_name = format!("{}.{}", id, upload.extension);
        let original = self
            .storage
            .save_original(&original_name, &upload.data)
            .await
            .map_err(ProcessError::StoreOriginal)?;

        let derived = identifier::derived_id(&id.to_string());
        let output_name = format!("{}.{}", derived, upload.extension);

        info!(
            "Compressing {} with {:?} into {}",
            original.display(),
            options,
            output_name
        );

        let encoded = Self::run_codec(upload.data, options).await?;
        self.store_derivative(&output_name, &encoded, options.kind())
            .await
    }

    /// Stores the original and converts PNG to JPEG or JPEG to PNG.
    ///
    /// The derivative name is derived from the original's storage path.
    pub async fn convert(&self, upload: ImageUpload) -> Result<ProcessedImage, ProcessError> {
        let id = identifier::new_original_id();
        let original_name = format!("{}.{}", id, upload.extension);
        let original = self
            .storage
            .save_original(&original_name, &upload.data)
            .await
            .map_err(ProcessError::StoreOriginal)?;

        let target = upload.kind.converted();
        let derived = identifier::derived_id(&original.to_string_lossy());
        let output_name = format!("{}.{}", derived, target.extension());

        info!(
            "Converting {} ({:?} -> {:?}) into {}",
            original.display(),
            upload.kind,
            target,
            output_name
        );

        let options = target.conversion_options();
        let encoded = Self::run_codec(upload.data, options).await?;
        self.store_derivative(&output_name, &encoded, target).await
    }

    async fn run_codec(data: Bytes, options: EncodeOptions) -> Result<Vec<u8>, ProcessError> {
        let encoded =
            tokio::task::spawn_blocking(move || codec::reencode(&data, options)).await??;
        Ok(encoded)
    }

    async fn store_derivative(
        &self,
        name: &str,
        data: &[u8],
        kind: ImageKind,
    ) -> Result<ProcessedImage, ProcessError> {
        let path = self
            .storage
            .save_processed(name, data)
            .await
            .map_err(ProcessError::StoreDerivative)?;

        let file = self.storage.relative_path(&path).ok_or_else(|| {
            ProcessError::StoreDerivative(anyhow::anyhow!(
                "{} is outside the upload root",
                path.display()
            ))
        })?;

        Ok(ProcessedImage { path, file, kind })
    }
}
