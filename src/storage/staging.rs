use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Local directory where uploads wait while the extractor reads them.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

/// A file written to the staging area. Call [`StagedFile::remove`] once done.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagingArea {
    /// Open (and create if needed) the staging directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to a fresh path ending in `filename`, which must
    /// already be sanitised. Every call gets its own file, even for equal names.
    pub async fn stage(&self, filename: &str, content: &[u8]) -> Result<StagedFile, AppError> {
        let path = self
            .root
            .join(format!("{}_{}", uuid::Uuid::new_v4().simple(), filename));
        tokio::fs::write(&path, content).await.map_err(|e| {
            AppError::Storage(format!("Failed to save '{}': {}", filename, e))
        })?;
        Ok(StagedFile { path })
    }
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn remove(self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::open(dir.path().join("uploads")).await.unwrap();

        let staged = staging.stage("20240101_000000_cv.pdf", b"%PDF-1.4").await.unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");

        staged.remove().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_same_name_gets_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::open(dir.path()).await.unwrap();

        let first = staging.stage("20240101_000000_cv.pdf", b"first").await.unwrap();
        let second = staging.stage("20240101_000000_cv.pdf", b"second").await.unwrap();

        assert_ne!(first.path(), second.path());
        assert!(first
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_20240101_000000_cv.pdf")));
        assert_eq!(std::fs::read(first.path()).unwrap(), b"first");
        assert_eq!(std::fs::read(second.path()).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::open(dir.path()).await.unwrap();
        let staged = staging.stage("gone.pdf", b"x").await.unwrap();
        std::fs::remove_file(staged.path()).unwrap();
        assert!(staged.remove().await.is_ok());
    }
}
