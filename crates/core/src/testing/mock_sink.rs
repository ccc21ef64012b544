//! Mock label sink for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::SetCode;
use crate::output::{label_file_name, LabelSink, OutputError};

/// In-memory label sink.
///
/// Stores written labels by code, can pretend labels already exist, and can
/// fail every write.
#[derive(Debug, Clone)]
pub struct MockSink {
    root: PathBuf,
    /// Written labels by canonical code.
    written: Arc<RwLock<HashMap<SetCode, Vec<u8>>>>,
    /// Codes reported as existing without having been written.
    existing: Arc<RwLock<Vec<SetCode>>>,
    /// Recorded write calls, in order.
    writes: Arc<RwLock<Vec<SetCode>>>,
    /// When set, every write fails.
    fail_writes: Arc<RwLock<bool>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/mock/labels"),
            written: Arc::new(RwLock::new(HashMap::new())),
            existing: Arc::new(RwLock::new(Vec::new())),
            writes: Arc::new(RwLock::new(Vec::new())),
            fail_writes: Arc::new(RwLock::new(false)),
        }
    }

    /// Report a label for `code` as already present.
    pub async fn add_existing(&self, code: &SetCode) {
        self.existing.write().await.push(code.clone());
    }

    /// Make every subsequent write fail.
    pub async fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().await = fail;
    }

    /// Codes written so far, in call order.
    pub async fn recorded_writes(&self) -> Vec<SetCode> {
        self.writes.read().await.clone()
    }

    /// Bytes of the label written for `code`.
    pub async fn written(&self, code: &SetCode) -> Option<Vec<u8>> {
        self.written.read().await.get(code).cloned()
    }
}

#[async_trait]
impl LabelSink for MockSink {
    fn label_path(&self, code: &SetCode) -> PathBuf {
        self.root.join(label_file_name(code))
    }

    async fn exists(&self, code: &SetCode) -> Result<bool, OutputError> {
        Ok(self.existing.read().await.contains(code)
            || self.written.read().await.contains_key(code))
    }

    async fn write(&self, code: &SetCode, png: &[u8]) -> Result<PathBuf, OutputError> {
        self.writes.write().await.push(code.clone());
        let path = self.label_path(code);

        if *self.fail_writes.read().await {
            return Err(OutputError::WriteFailed {
                path,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mock failure"),
            });
        }

        self.written.write().await.insert(code.clone(), png.to_vec());
        Ok(path)
    }
}
