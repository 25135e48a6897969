//! # Image Acquisition
//!
//! Turns a file picked by the cashier (or dropped bytes) into an
//! [`ImageUpload`] a barcode decoder can work on.
//!
//! ```text
//! file path ──► metadata size check ──► read ──┐
//!                                              ├──► sniff magic bytes ──► ImageUpload
//! dropped bytes + name ────────────────────────┘
//! ```
//!
//! The content type comes from the bytes, never from the file extension.

use std::path::Path;
use tracing::debug;

use crate::error::{DecodeError, DecodeResult};

/// Largest image accepted, matching the server's upload limit.
pub const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;

/// Raster formats the decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
    Tiff,
}

impl ImageFormat {
    /// Identifies the format from the leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageFormat::Gif),
            [b'B', b'M', ..] => Some(ImageFormat::Bmp),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(ImageFormat::Webp),
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

/// A validated image ready for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Builds an upload from raw bytes (drag-and-drop).
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> DecodeResult<Self> {
        let file_name = file_name.into();

        if bytes.is_empty() {
            return Err(DecodeError::EmptyImage);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(DecodeError::TooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        let format =
            ImageFormat::sniff(&bytes).ok_or_else(|| DecodeError::UnsupportedFormat {
                file_name: file_name.clone(),
            })?;

        debug!(file_name = %file_name, size = bytes.len(), ?format, "Image accepted");
        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    /// Reads an image from disk (file picker).
    ///
    /// The size is checked before reading so an oversized file is never
    /// loaded into memory.
    pub async fn from_path(path: impl AsRef<Path>) -> DecodeResult<Self> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        if size > MAX_IMAGE_BYTES as u64 {
            return Err(DecodeError::TooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                limit: MAX_IMAGE_BYTES,
            });
        }

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Self::from_bytes(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png() -> Vec<u8> {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        bytes
    }

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(&png()), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"BM\x00\x00"), Some(ImageFormat::Bmp));
        assert_eq!(ImageFormat::sniff(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"II*\x00...."), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn test_from_bytes() {
        let upload = ImageUpload::from_bytes("strip.png", png()).unwrap();
        assert_eq!(upload.file_name(), "strip.png");
        assert_eq!(upload.content_type(), "image/png");
        assert_eq!(upload.len(), 40);
    }

    #[test]
    fn test_from_bytes_rejects() {
        assert!(matches!(
            ImageUpload::from_bytes("empty.png", Vec::new()),
            Err(DecodeError::EmptyImage)
        ));
        assert!(matches!(
            ImageUpload::from_bytes("notes.txt", b"hello".to_vec()),
            Err(DecodeError::UnsupportedFormat { .. })
        ));

        let mut huge = png();
        huge.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(matches!(
            ImageUpload::from_bytes("huge.png", huge),
            Err(DecodeError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.png");
        std::fs::write(&path, png()).unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name(), "box.png");
        assert_eq!(upload.format(), ImageFormat::Png);

        let missing = ImageUpload::from_path(dir.path().join("missing.png")).await;
        assert!(matches!(missing, Err(DecodeError::Io(_))));
    }
}
