//! Turning selected image files into embeddable `data:` URIs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// MIME type used when the bytes and the name say nothing useful.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Errors from reading or encoding an image.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the selected file's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Read lazily from disk when encoding starts.
    Path(PathBuf),
    /// Already in memory.
    Bytes(Vec<u8>),
}

/// A file chosen in the image picker.
///
/// `size` is what the picker reported; validation runs against it before any
/// bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub source: FileSource,
}

impl SelectedFile {
    /// Select a file on disk, taking its size from the filesystem.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, EncodeError> {
        let path = path.as_ref().to_path_buf();
        let metadata = fs::metadata(&path).await.map_err(|source| EncodeError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            name,
            size: metadata.len(),
            source: FileSource::Path(path),
        })
    }

    /// Select an in-memory file.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(bytes),
        }
    }

    /// Read the file's bytes, suspending until the read completes or fails.
    pub async fn read(&self) -> Result<Vec<u8>, EncodeError> {
        match &self.source {
            FileSource::Path(path) => fs::read(path).await.map_err(|source| EncodeError::Read {
                path: path.clone(),
                source,
            }),
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Read `file` and encode it as a `data:<mime>;base64,...` URI.
pub async fn encode_data_url(file: &SelectedFile) -> Result<String, EncodeError> {
    let bytes = file.read().await?;
    let mime = sniff_mime(&bytes, &file.name);
    Ok(data_url(mime, &bytes))
}

/// Build a base64 `data:` URI.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Guess an image MIME type from magic bytes, then from the file extension.
pub fn sniff_mime(bytes: &[u8], name: &str) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return "image/png";
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if bytes.starts_with(b"BM") {
        return "image/bmp";
    }

    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => FALLBACK_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_sniff_magic_beats_extension() {
        assert_eq!(sniff_mime(PNG_HEADER, "photo.jpg"), "image/png");
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0], "x"), "image/jpeg");
        assert_eq!(sniff_mime(b"GIF89a....", "x"), "image/gif");
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 ", "x"), "image/webp");
    }

    #[test]
    fn test_sniff_falls_back_to_extension() {
        assert_eq!(sniff_mime(b"<svg xmlns", "logo.SVG"), "image/svg+xml");
        assert_eq!(sniff_mime(b"????", "mystery.bin"), FALLBACK_MIME);
        assert_eq!(sniff_mime(b"", "noext"), FALLBACK_MIME);
    }

    #[test]
    fn test_data_url() {
        assert_eq!(data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
        assert_eq!(data_url("image/png", b""), "data:image/png;base64,");
    }

    #[tokio::test]
    async fn test_encode_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "pic.png");
        assert_eq!(file.size, PNG_HEADER.len() as u64);

        let url = encode_data_url(&file).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let payload = url.trim_start_matches("data:image/png;base64,");
        assert_eq!(STANDARD.decode(payload).unwrap(), PNG_HEADER);
    }

    #[tokio::test]
    async fn test_encode_missing_file_fails() {
        let file = SelectedFile {
            name: "gone.png".to_string(),
            size: 10,
            source: FileSource::Path(PathBuf::from("/definitely/not/here/gone.png")),
        };
        assert!(matches!(
            encode_data_url(&file).await,
            Err(EncodeError::Read { .. })
        ));
    }
}
