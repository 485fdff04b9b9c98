//! Cheap checks on submitted bytes before a full decode.

use crate::config::LimitsConfig;
use crate::error::{EditError, NO_IMAGE};

/// Validates submitted image bytes.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - Something was submitted at all
    /// - Size is within limits
    /// - Bytes start with a known raster image signature
    pub fn validate(&self, bytes: &[u8]) -> Result<(), EditError> {
        if bytes.is_empty() {
            return Err(EditError::InvalidInput(NO_IMAGE.to_string()));
        }

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(EditError::InvalidInput(format!(
                "image is too large ({}MB > {}MB)",
                bytes.len() as u64 / (1024 * 1024),
                self.limits.max_file_size_mb
            )));
        }

        if bytes.len() < 4 {
            return Err(EditError::InvalidInput(
                "file too small to be a valid image".to_string(),
            ));
        }

        if !is_valid_image_header(bytes) {
            return Err(EditError::InvalidInput(
                "unrecognized image format (invalid magic bytes)".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check if the leading bytes match a known image format.
fn is_valid_image_header(bytes: &[u8]) -> bool {
    let header = &bytes[..bytes.len().min(12)];

    // JPEG: FF D8 FF
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }

    // PNG: 89 50 4E 47
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return true;
    }

    // GIF: GIF8
    if header.starts_with(b"GIF8") {
        return true;
    }

    // WebP: RIFF....WEBP
    if header.starts_with(b"RIFF") {
        return header.len() < 12 || &header[8..12] == b"WEBP";
    }

    // BMP: BM
    if header.starts_with(b"BM") {
        return true;
    }

    // TIFF: II*\0 or MM\0*
    if header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        return true;
    }

    // AVIF and friends: ftyp box at offset 4
    header.len() >= 12 && &header[4..8] == b"ftyp"
}
