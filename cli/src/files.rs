use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions the server will extract from.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// A file read from disk and ready to be sent.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub content: Vec<u8>,
}

pub fn is_allowed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Split the requested paths into uploadable ones and rejected ones.
pub fn partition_allowed(paths: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    paths.into_iter().partition(|p| is_allowed(p))
}

pub async fn read_upload(path: &Path) -> Result<UploadFile> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(UploadFile {
        name,
        mime,
        content,
    })
}
