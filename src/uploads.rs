//! Multipart uploads stored on local disk under the upload root.
//!
//! Files land at `<root>/<subdir>/<uuid>.<ext>` and are addressed by the
//! public URL `/uploads/<subdir>/<uuid>.<ext>`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;

use crate::errors::{HubError, Result};

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub path: PathBuf,
    pub content_type: String,
}

impl StoredFile {
    /// Coarse media class used by article sections.
    pub fn media_type(&self) -> &'static str {
        match self.content_type.split('/').next() {
            Some("image") => "image",
            Some("video") => "video",
            Some("audio") => "audio",
            _ => "file",
        }
    }
}

/// A parsed multipart body: at most one stored file plus the text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<StoredFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn require_file(&mut self, field: &str) -> Result<StoredFile> {
        self.file
            .take()
            .ok_or_else(|| HubError::validation(format!("No file uploaded in field '{}'", field)))
    }
}

fn extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);
    from_name
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|exts| exts.first())
                .map(|e| e.to_string())
        })
        .unwrap_or_else(|| "bin".to_string())
}

/// Read a multipart body, saving the part named `file_field` to disk.
pub async fn receive(
    mut multipart: Multipart,
    root: &Path,
    subdir: &str,
    file_field: &str,
    max_bytes: usize,
) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HubError::validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let content_type = field
                .content_type()
                .map(String::from)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let ext = extension(field.file_name(), &content_type);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| HubError::validation(format!("Failed to read upload: {}", e)))?;
            if bytes.is_empty() {
                return Err(HubError::validation("Uploaded file is empty"));
            }
            if bytes.len() > max_bytes {
                return Err(HubError::validation(format!(
                    "Upload of {} bytes exceeds the {} byte limit",
                    bytes.len(),
                    max_bytes
                )));
            }
            let dir = root.join(subdir);
            tokio::fs::create_dir_all(&dir).await?;
            let file_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
            let path = dir.join(&file_name);
            tokio::fs::write(&path, &bytes).await?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "upload stored");
            form.file = Some(StoredFile {
                url: format!("/uploads/{}/{}", subdir, file_name),
                path,
                content_type,
            });
        } else if !name.is_empty() {
            let value = field
                .text()
                .await
                .map_err(|e| {
                    HubError::validation(format!("Failed to read field '{}': {}", name, e))
                })?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_prefers_file_name() {
        assert_eq!(extension(Some("Photo.PNG"), "image/jpeg"), "png");
        assert_eq!(extension(Some("noext"), "image/png"), "png");
        assert_eq!(extension(Some("evil.p/h"), "application/x-unknown-thing"), "bin");
        assert_eq!(extension(None, "application/x-unknown-thing"), "bin");
    }

    #[test]
    fn test_media_type() {
        let file = |ct: &str| StoredFile {
            url: String::new(),
            path: PathBuf::new(),
            content_type: ct.to_string(),
        };
        assert_eq!(file("image/png").media_type(), "image");
        assert_eq!(file("video/mp4").media_type(), "video");
        assert_eq!(file("application/pdf").media_type(), "file");
    }

    #[test]
    fn test_require_file() {
        let mut form = UploadForm::default();
        assert!(matches!(form.require_file("media"), Err(HubError::Validation(_))));
    }
}
