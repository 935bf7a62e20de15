//! Image references accepted by the try-on client
//!
//! The provider takes either a URL or an inline data URI. Local files are
//! read and encoded as `data:<mime>;base64,<payload>`.

use base64::{engine::general_purpose, Engine as _};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::{InferenceError, Result};

/// A URL or data URI the provider can fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    DataUri(String),
}

impl ImageRef {
    /// Classify a string that is already a URL or data URI
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let lower = input.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(Self::Url(input.to_string()))
        } else if lower.starts_with("data:image/") && input.contains(";base64,") {
            Some(Self::DataUri(input.to_string()))
        } else {
            None
        }
    }

    /// Encode raw image bytes, sniffing the format from their header
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)?;
        let data_uri = format!(
            "data:{};base64,{}",
            format.to_mime_type(),
            general_purpose::STANDARD.encode(bytes)
        );
        Ok(Self::DataUri(data_uri))
    }

    /// Read and encode an image file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).await?;

        debug!("Encoding {} ({} bytes)", path.display(), bytes.len());

        Self::from_bytes(&bytes)
    }

    /// Accept a URL, a data URI, or a path to an image file
    pub async fn resolve(input: &str) -> Result<Self> {
        if let Some(image) = Self::parse(input) {
            return Ok(image);
        }

        let path = Path::new(input.trim());
        if !path.is_file() {
            return Err(InferenceError::UnsupportedImage(format!(
                "{} is neither a URL, a data URI nor an existing file",
                input
            )));
        }

        Self::from_path(path).await
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::DataUri(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Url(s) | Self::DataUri(s) => s,
        }
    }
}

/// Shorten a long value (typically a data URI) for display, appending `...`
pub fn preview(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::tempdir;

    fn write_png(path: &Path) {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(4, 4, Rgb([200, 30, 30]));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            ImageRef::parse("https://example.com/p.jpg"),
            Some(ImageRef::Url("https://example.com/p.jpg".to_string()))
        );
        assert_eq!(
            ImageRef::parse("data:image/png;base64,iVBORw0KGgo="),
            Some(ImageRef::DataUri("data:image/png;base64,iVBORw0KGgo=".to_string()))
        );
        assert_eq!(ImageRef::parse("photo.jpg"), None);
        assert_eq!(ImageRef::parse("data:text/plain;base64,aGk="), None);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
        assert_eq!(preview("ドレスの画像", 2), "ドレ...");
    }

    #[test]
    fn test_from_bytes_rejects_non_image() {
        assert!(ImageRef::from_bytes(b"definitely not an image").is_err());
    }

    #[tokio::test]
    async fn test_resolve_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("person.png");
        write_png(&path);

        let image = ImageRef::resolve(path.to_str().unwrap()).await.unwrap();

        assert!(matches!(image, ImageRef::DataUri(_)));
        assert!(image.as_str().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[tokio::test]
    async fn test_resolve_passthrough() {
        let image = ImageRef::resolve("https://example.com/garment.png").await.unwrap();
        assert_eq!(image.into_string(), "https://example.com/garment.png");
    }

    #[tokio::test]
    async fn test_resolve_missing_file() {
        let err = ImageRef::resolve("/nonexistent/person.png").await.unwrap_err();
        assert!(matches!(err, InferenceError::UnsupportedImage(_)));
    }
}
