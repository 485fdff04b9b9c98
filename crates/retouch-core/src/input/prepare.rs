//! Decoding and RGBA normalisation of the submitted image.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use super::validate::Validator;
use crate::config::LimitsConfig;
use crate::error::EditError;

/// Image ready for upload: a 4-channel PNG.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// PNG-encoded RGBA pixels
    pub png: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Format the caller submitted, e.g. "jpeg"
    pub source_format: String,
}

impl PreparedImage {
    pub const MIME_TYPE: &'static str = "image/png";

    /// Size of the upload payload in bytes.
    pub fn len(&self) -> usize {
        self.png.len()
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }
}

/// Validates, decodes and re-encodes submitted images.
pub struct ImagePreparer {
    limits: LimitsConfig,
}

impl ImagePreparer {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Turn raw submitted bytes into an upload-ready RGBA PNG.
    ///
    /// Decoding runs on the blocking pool under `limits.decode_timeout_ms`.
    pub async fn prepare(&self, bytes: Vec<u8>) -> Result<PreparedImage, EditError> {
        Validator::new(self.limits.clone()).validate(&bytes)?;

        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);
        let result = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || normalize_sync(bytes)),
        )
        .await;

        let prepared = match result {
            Ok(Ok(Ok(prepared))) => prepared,
            Ok(Ok(Err(e))) => return Err(e),
            Ok(Err(e)) => {
                return Err(EditError::InvalidInput(format!("decode task failed: {e}")));
            }
            Err(_) => {
                return Err(EditError::InvalidInput(format!(
                    "decoding took longer than {}ms",
                    self.limits.decode_timeout_ms
                )));
            }
        };

        let max_dim = self.limits.max_image_dimension;
        if prepared.width > max_dim || prepared.height > max_dim {
            return Err(EditError::InvalidInput(format!(
                "image is {}x{}, larger than {max_dim} on a side",
                prepared.width, prepared.height
            )));
        }

        tracing::debug!(
            "Prepared {}x{} {} image ({} bytes as PNG)",
            prepared.width,
            prepared.height,
            prepared.source_format,
            prepared.png.len()
        );
        Ok(prepared)
    }
}

/// Synchronous decode + RGBA PNG encode (runs in spawn_blocking).
fn normalize_sync(bytes: Vec<u8>) -> Result<PreparedImage, EditError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EditError::InvalidInput(format!("cannot detect image format: {e}")))?;
    let format = reader
        .format()
        .ok_or_else(|| EditError::InvalidInput("unsupported image format".to_string()))?;
    let decoded = reader
        .decode()
        .map_err(|e| EditError::InvalidInput(e.to_string()))?;

    let (width, height) = decoded.dimensions();
    let rgba = DynamicImage::ImageRgba8(decoded.to_rgba8());

    let mut png = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| EditError::InvalidInput(format!("cannot re-encode image: {e}")))?;

    Ok(PreparedImage {
        png,
        width,
        height,
        source_format: format_to_string(format),
    })
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .unwrap();
        out
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[tokio::test]
    async fn test_prepare_normalizes_to_rgba_png() {
        let preparer = ImagePreparer::new(LimitsConfig::default());
        let prepared = preparer.prepare(jpeg_bytes(8, 6)).await.unwrap();

        assert_eq!(prepared.source_format, "jpeg");
        assert_eq!((prepared.width, prepared.height), (8, 6));

        let roundtrip = image::load_from_memory_with_format(&prepared.png, ImageFormat::Png).unwrap();
        assert_eq!(roundtrip.color(), image::ColorType::Rgba8);
    }

    #[tokio::test]
    async fn test_prepare_rejects_oversized_dimensions() {
        let limits = LimitsConfig {
            max_image_dimension: 4,
            ..LimitsConfig::default()
        };
        let err = ImagePreparer::new(limits)
            .prepare(jpeg_bytes(8, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_prepare_rejects_truncated_png() {
        let bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0];
        let err = ImagePreparer::new(LimitsConfig::default())
            .prepare(bytes)
            .await
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidInput(_)));
    }
}
