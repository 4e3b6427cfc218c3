//! File-backed alarm code storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hearth_io::{CodePersistence, IoError};
use hearth_types::AlarmCode;
use tracing::{debug, info};

/// Keeps the alarm code in a one-line text file.
///
/// A missing file reads as the seed code; the file is only created on the
/// first [`set_code`](CodePersistence::set_code).
#[derive(Debug, Clone)]
pub struct FileCodeStore {
    path: PathBuf,
    seed: AlarmCode,
}

impl FileCodeStore {
    pub fn new(path: impl Into<PathBuf>, seed: AlarmCode) -> Self {
        Self {
            path: path.into(),
            seed,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CodePersistence for FileCodeStore {
    async fn get_code(&self) -> Result<AlarmCode, IoError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(AlarmCode::parse(content.trim())?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored code, using default");
                Ok(self.seed.clone())
            }
            Err(e) => Err(IoError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn set_code(&self, code: &AlarmCode) -> Result<(), IoError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| IoError::Storage(format!("failed to create code dir: {e}")))?;
        }
        tokio::fs::write(&self.path, format!("{}\n", code.as_str()))
            .await
            .map_err(|e| {
                IoError::Storage(format!("failed to write {}: {e}", self.path.display()))
            })?;
        info!(path = %self.path.display(), "stored new alarm code");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCodeStore::new(dir.path().join("code"), AlarmCode::parse("1234").unwrap());
        assert_eq!(store.get_code().await.unwrap().as_str(), "1234");
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn set_code_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("code");
        let seed = AlarmCode::parse("1234").unwrap();

        let store = FileCodeStore::new(&path, seed.clone());
        store.set_code(&AlarmCode::parse("0042").unwrap()).await.unwrap();

        let reopened = FileCodeStore::new(&path, seed);
        assert!(reopened.get_code().await.unwrap().matches("0042"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code");
        std::fs::write(&path, "12ab\n").unwrap();
        let store = FileCodeStore::new(&path, AlarmCode::parse("1234").unwrap());
        assert!(matches!(
            store.get_code().await,
            Err(IoError::InvalidCodeFormat(_))
        ));
    }
}
