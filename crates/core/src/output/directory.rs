//! Directory-backed label sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::error::OutputError;
use super::{label_file_name, LabelSink};
use crate::catalog::SetCode;

/// Writes labels as `<dir>/<CODE>_label.png`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn ensure_dir(&self) -> Result<(), OutputError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| OutputError::DirectoryCreationFailed {
                path: self.dir.clone(),
                source: e,
            })
    }

    fn temp_path(&self, code: &SetCode) -> PathBuf {
        self.dir.join(format!(
            ".{}.{}.tmp",
            label_file_name(code),
            std::process::id()
        ))
    }
}

#[async_trait]
impl LabelSink for DirectorySink {
    fn label_path(&self, code: &SetCode) -> PathBuf {
        self.dir.join(label_file_name(code))
    }

    async fn exists(&self, code: &SetCode) -> Result<bool, OutputError> {
        let path = self.label_path(code);
        fs::try_exists(&path)
            .await
            .map_err(|e| OutputError::InspectFailed { path, source: e })
    }

    async fn write(&self, code: &SetCode, png: &[u8]) -> Result<PathBuf, OutputError> {
        self.ensure_dir().await?;

        let destination = self.label_path(code);
        let temp = self.temp_path(code);

        fs::write(&temp, png)
            .await
            .map_err(|e| OutputError::WriteFailed {
                path: temp.clone(),
                source: e,
            })?;

        if let Err(e) = fs::rename(&temp, &destination).await {
            let _ = fs::remove_file(&temp).await;
            return Err(OutputError::MoveFailed {
                source: temp,
                destination,
                error: e,
            });
        }

        debug!("Wrote {} ({} bytes)", destination.display(), png.len());
        Ok(destination)
    }
}
