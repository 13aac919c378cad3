use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder};
use thiserror::Error;

/// Highest PNG compression level accepted by [`EncodeOptions::Png`]
pub const PNG_MAX_LEVEL: u8 = 3;

/// JPEG quality bounds accepted by [`EncodeOptions::Jpeg`]
pub const JPEG_MIN_QUALITY: u8 = 1;
pub const JPEG_MAX_QUALITY: u8 = 100;

/// Quality used when converting into JPEG
pub const JPEG_CONVERT_QUALITY: u8 = 95;

/// Compression level used when converting into PNG
pub const PNG_CONVERT_LEVEL: u8 = 2;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Image formats the service can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Maps a lowercase extension (without the dot) to a supported kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// The kind a conversion produces: PNG becomes JPEG and vice versa.
    pub fn converted(self) -> Self {
        match self {
            Self::Png => Self::Jpeg,
            Self::Jpeg => Self::Png,
        }
    }

    /// Extension written for converted output.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn mime(self) -> mime::Mime {
        match self {
            Self::Png => mime::IMAGE_PNG,
            Self::Jpeg => mime::IMAGE_JPEG,
        }
    }

    /// Encoder settings used for format conversion.
    pub fn conversion_options(self) -> EncodeOptions {
        match self {
            Self::Png => EncodeOptions::Png {
                level: PNG_CONVERT_LEVEL,
            },
            Self::Jpeg => EncodeOptions::Jpeg {
                quality: JPEG_CONVERT_QUALITY,
            },
        }
    }
}

/// Encoder settings. Values are expected to be clamped already.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOptions {
    /// 0 (fastest) ..= 3 (smallest output)
    Png { level: u8 },
    /// 1 ..= 100
    Jpeg { quality: u8 },
}

impl EncodeOptions {
    pub fn kind(&self) -> ImageKind {
        match self {
            Self::Png { .. } => ImageKind::Png,
            Self::Jpeg { .. } => ImageKind::Jpeg,
        }
    }
}

fn png_settings(level: u8) -> (CompressionType, FilterType) {
    match level.min(PNG_MAX_LEVEL) {
        0 => (CompressionType::Fast, FilterType::NoFilter),
        1 => (CompressionType::Fast, FilterType::Adaptive),
        2 => (CompressionType::Default, FilterType::Adaptive),
        _ => (CompressionType::Best, FilterType::Adaptive),
    }
}

/// Decodes any supported image, sniffing the format from its content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    image::load_from_memory(bytes).map_err(CodecError::Decode)
}

/// Encodes `img` with the given settings and returns the file bytes.
pub fn encode(img: &DynamicImage, options: EncodeOptions) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();

    match options {
        EncodeOptions::Png { level } => {
            // The PNG encoder only takes 8-bit buffers here; widen everything else to RGBA8.
            let converted;
            let img = match img.color() {
                ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => img,
                _ => {
                    converted = DynamicImage::ImageRgba8(img.to_rgba8());
                    &converted
                }
            };

            let (compression, filter) = png_settings(level);
            PngEncoder::new_with_quality(&mut out, compression, filter)
                .write_image(img.as_bytes(), img.width(), img.height(), img.color())
                .map_err(CodecError::Encode)?;
        }
        EncodeOptions::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            let quality = quality.clamp(JPEG_MIN_QUALITY, JPEG_MAX_QUALITY);
            JpegEncoder::new_with_quality(&mut out, quality)
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                .map_err(CodecError::Encode)?;
        }
    }

    Ok(out)
}

/// Decodes `bytes` and re-encodes them with `options`.
pub fn reencode(bytes: &[u8], options: EncodeOptions) -> Result<Vec<u8>, CodecError> {
    let img = decode(bytes)?;
    encode(&img, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(16, 12, |x, y| {
            Rgba([(x * 15) as u8, (y * 20) as u8, 128, 255])
        }))
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(ImageKind::from_extension("png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("jpg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("gif"), None);
        assert_eq!(ImageKind::from_extension("PNG"), None);
    }

    #[test]
    fn test_converted_extension() {
        assert_eq!(ImageKind::Png.converted().extension(), "jpeg");
        assert_eq!(ImageKind::Jpeg.converted().extension(), "png");
    }

    #[test]
    fn test_png_levels_produce_png() {
        let img = sample_image();
        for level in 0..=PNG_MAX_LEVEL {
            let bytes = encode(&img, EncodeOptions::Png { level }).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
            let decoded = decode(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (16, 12));
        }
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let bytes = encode(&sample_image(), EncodeOptions::Jpeg { quality: 80 }).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        assert!(!decode(&bytes).unwrap().color().has_alpha());
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let img = sample_image();
        let low = encode(&img, EncodeOptions::Jpeg { quality: 1 }).unwrap();
        let high = encode(&img, EncodeOptions::Jpeg { quality: 100 }).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_sixteen_bit_png_is_widened() {
        let img = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(4, 4, image::Rgb([1000u16, 2000, 3000])));
        let bytes = encode(&img, EncodeOptions::Png { level: 1 }).unwrap();
        assert_eq!(decode(&bytes).unwrap().color(), ColorType::Rgba8);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
