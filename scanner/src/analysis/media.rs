use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::inference::MediaUpload;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media reference is not a base64 data URL")]
    NotDataUrl,
    #[error("Media payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to read media file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        _ => "bin",
    }
}

/// Raw content of one user-selected file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    pub async fn read(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, mime_for_path(path), content))
    }

    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.content.len() as f64 / 1024.0 / 1024.0)
    }

    pub fn to_upload(&self) -> MediaUpload {
        MediaUpload {
            file_name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            content: self.content.clone(),
        }
    }
}

/// Inline `data:<mime>;base64,<payload>` representation of analyzed media,
/// kept in scan records for later display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn from_file(file: &MediaFile) -> Self {
        Self(format!(
            "data:{};base64,{}",
            file.mime_type,
            STANDARD.encode(&file.content)
        ))
    }

    /// Wraps an existing data URL without decoding it.
    pub fn from_data_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn decode(&self) -> Result<(String, Vec<u8>), MediaError> {
        let rest = self.0.strip_prefix("data:").ok_or(MediaError::NotDataUrl)?;
        let (mime_type, payload) = rest.split_once(";base64,").ok_or(MediaError::NotDataUrl)?;
        let mime_type = if mime_type.is_empty() {
            "application/octet-stream"
        } else {
            mime_type
        };
        Ok((mime_type.to_string(), STANDARD.decode(payload.trim())?))
    }

    pub fn to_upload(&self, stem: &str) -> Result<MediaUpload, MediaError> {
        let (mime_type, content) = self.decode()?;
        Ok(MediaUpload {
            file_name: format!("{}.{}", stem, extension_for_mime(&mime_type)),
            mime_type,
            content,
        })
    }
}
