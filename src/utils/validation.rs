use crate::services::codec::{
    EncodeOptions, ImageKind, JPEG_MAX_QUALITY, JPEG_MIN_QUALITY, PNG_MAX_LEVEL,
};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Lowercase extension of an uploaded filename, without the dot.
///
/// Only the final path component is considered, so client supplied
/// directories never influence the result.
pub fn file_extension(filename: &str) -> Result<String, ValidationError> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Ok(ext.to_lowercase()),
        _ => Err(ValidationError::new("NO_EXTENSION", "File has no extension")),
    }
}

/// Maps an extension to a supported image kind.
pub fn supported_kind(extension: &str) -> Result<ImageKind, ValidationError> {
    ImageKind::from_extension(extension)
        .ok_or_else(|| ValidationError::new("UNSUPPORTED_FORMAT", "Unsupported format"))
}

/// Parses the `level` query parameter. Any integer is accepted; clamping happens later.
pub fn parse_level(raw: Option<&str>) -> Result<i64, ValidationError> {
    raw.and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| ValidationError::new("INVALID_LEVEL", "Invalid compression level"))
}

/// Clamps a requested level into the encoder range for `kind`.
///
/// PNG levels are clamped into `[0, 3]`, JPEG qualities into `[1, 100]`.
pub fn clamp_level(kind: ImageKind, level: i64) -> EncodeOptions {
    match kind {
        ImageKind::Png => EncodeOptions::Png {
            level: level.clamp(0, PNG_MAX_LEVEL as i64) as u8,
        },
        ImageKind::Jpeg => EncodeOptions::Jpeg {
            quality: level.clamp(JPEG_MIN_QUALITY as i64, JPEG_MAX_QUALITY as i64) as u8,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.png").unwrap(), "png");
        assert_eq!(file_extension("Photo.JPG").unwrap(), "jpg");
        assert_eq!(file_extension("archive.tar.jpeg").unwrap(), "jpeg");
        assert_eq!(file_extension("../../evil/photo.png").unwrap(), "png");

        assert_eq!(file_extension("photo").unwrap_err().code, "NO_EXTENSION");
        assert_eq!(file_extension("photo.").unwrap_err().code, "NO_EXTENSION");
        assert_eq!(file_extension("").unwrap_err().code, "NO_EXTENSION");
        assert_eq!(file_extension("dir.png/").unwrap(), "png");
    }

    #[test]
    fn test_supported_kind() {
        assert_eq!(supported_kind("png").unwrap(), ImageKind::Png);
        assert_eq!(supported_kind("jpg").unwrap(), ImageKind::Jpeg);
        assert_eq!(supported_kind("jpeg").unwrap(), ImageKind::Jpeg);
        assert_eq!(supported_kind("gif").unwrap_err().code, "UNSUPPORTED_FORMAT");
        assert_eq!(supported_kind("webp").unwrap_err().message, "Unsupported format");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("5")).unwrap(), 5);
        assert_eq!(parse_level(Some("-7")).unwrap(), -7);
        assert_eq!(parse_level(Some("+2")).unwrap(), 2);
        assert!(parse_level(Some("high")).is_err());
        assert!(parse_level(Some("")).is_err());
        assert!(parse_level(Some("1.5")).is_err());
        assert!(parse_level(None).is_err());
    }

    #[test]
    fn test_clamp_png_level() {
        assert_eq!(clamp_level(ImageKind::Png, 10), EncodeOptions::Png { level: 3 });
        assert_eq!(clamp_level(ImageKind::Png, -4), EncodeOptions::Png { level: 0 });
        assert_eq!(clamp_level(ImageKind::Png, 2), EncodeOptions::Png { level: 2 });
    }

    #[test]
    fn test_clamp_jpeg_quality() {
        assert_eq!(clamp_level(ImageKind::Jpeg, 0), EncodeOptions::Jpeg { quality: 1 });
        assert_eq!(clamp_level(ImageKind::Jpeg, 250), EncodeOptions::Jpeg { quality: 100 });
        assert_eq!(clamp_level(ImageKind::Jpeg, 75), EncodeOptions::Jpeg { quality: 75 });
        assert_eq!(
            clamp_level(ImageKind::Jpeg, i64::MIN),
            EncodeOptions::Jpeg { quality: 1 }
        );
    }
}
