//! Scoped scratch storage for returned images.
//!
//! Each image returned by the model is written to its own temp file. The file
//! belongs to the [`SavedImage`] and is removed when that value is dropped, so
//! nothing outlives the call unless the caller exports it.

use image::{DynamicImage, ImageFormat};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Factory for per-call scratch files.
#[derive(Debug, Clone, Default)]
pub struct ScratchSpace {
    dir: Option<PathBuf>,
}

impl ScratchSpace {
    /// Scratch files go to `dir`, or the system temp directory when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Write `data` to a fresh temp file named after its MIME type.
    pub fn save(&self, data: &[u8], mime_type: &str) -> std::io::Result<SavedImage> {
        let suffix = format!(".{}", extension_for_mime(mime_type));
        let mut builder = tempfile::Builder::new();
        builder.prefix("retouch-").suffix(&suffix);

        let mut file = match &self.dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        file.write_all(data)?;
        file.flush()?;

        Ok(SavedImage {
            file,
            mime_type: mime_type.to_string(),
            len: data.len() as u64,
        })
    }
}

/// An image returned by the model, held in a scoped temp file.
#[derive(Debug)]
pub struct SavedImage {
    file: NamedTempFile,
    mime_type: String,
    len: u64,
}

impl SavedImage {
    /// Path of the scratch file. Only valid while `self` is alive.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Content type declared by the model.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// File extension matching the declared content type.
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }

    /// Read back the raw bytes.
    pub fn bytes(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.file.path())
    }

    /// Decode the image. The declared content type is only a hint; the
    /// format is sniffed from the bytes.
    pub fn decode(&self) -> image::ImageResult<DynamicImage> {
        image::load_from_memory(&self.bytes()?)
    }

    /// Write the image to `dest` and release the scratch file.
    ///
    /// When `dest`'s extension names the same format the bytes are copied as
    /// is. Otherwise the image is re-encoded, flattening RGBA to RGB for
    /// formats without an alpha channel.
    pub fn export(self, dest: &Path) -> std::io::Result<PathBuf> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let target = ImageFormat::from_path(dest).ok();
        let source = ImageFormat::from_mime_type(&self.mime_type);
        if target.is_none() || target == source {
            std::fs::copy(self.file.path(), dest)?;
            return Ok(dest.to_path_buf());
        }

        let decoded = self.decode().map_err(std::io::Error::other)?;
        let decoded = match target {
            Some(ImageFormat::Jpeg) if decoded.color().has_alpha() => {
                DynamicImage::ImageRgb8(decoded.to_rgb8())
            }
            _ => decoded,
        };
        decoded.save(dest).map_err(std::io::Error::other)?;
        Ok(dest.to_path_buf())
    }
}

/// Map a declared image MIME type to a file extension.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/png" => "png",
        other => {
            tracing::warn!("Unknown image MIME type '{other}', defaulting to .png");
            "png"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("application/octet-stream"), "png");
    }

    #[test]
    fn test_save_uses_scratch_dir_and_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(Some(dir.path().to_path_buf()));
        let saved = scratch.save(&png_bytes(), "image/png").unwrap();

        assert!(saved.path().starts_with(dir.path()));
        assert_eq!(saved.path().extension().unwrap(), "png");
        assert_eq!(saved.mime_type(), "image/png");
        assert!(!saved.is_empty());
    }

    #[test]
    fn test_scratch_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(Some(dir.path().to_path_buf()));
        let saved = scratch.save(&png_bytes(), "image/png").unwrap();
        let path = saved.path().to_path_buf();
        assert!(path.exists());

        drop(saved);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_same_format_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = png_bytes();
        let saved = ScratchSpace::new(Some(dir.path().to_path_buf()))
            .save(&bytes, "image/png")
            .unwrap();
        let scratch_path = saved.path().to_path_buf();

        let dest = dir.path().join("out/edited.png");
        saved.export(&dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), bytes);
        assert!(!scratch_path.exists());
    }

    #[test]
    fn test_export_to_jpeg_flattens_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let saved = ScratchSpace::new(Some(dir.path().to_path_buf()))
            .save(&png_bytes(), "image/png")
            .unwrap();

        let dest = dir.path().join("edited.jpg");
        saved.export(&dest).unwrap();

        let reopened = image::open(&dest).unwrap();
        assert!(!reopened.color().has_alpha());
    }
}
