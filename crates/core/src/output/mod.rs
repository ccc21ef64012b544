//! Output sink: where finished labels are persisted.
//!
//! The batch pipeline talks to a [`LabelSink`]; [`DirectorySink`] writes
//! `<CODE>_label.png` files into a directory, going through a temporary
//! sibling so a crash never leaves a half-written label behind.

mod directory;
mod error;

pub use directory::DirectorySink;
pub use error::OutputError;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::catalog::SetCode;

/// File name of the label for `code`.
pub fn label_file_name(code: &SetCode) -> String {
    format!("{}_label.png", code)
}

/// Destination for rendered labels.
#[async_trait]
pub trait LabelSink: Send + Sync {
    /// Where the label for `code` lives (or would live).
    fn label_path(&self, code: &SetCode) -> PathBuf;

    /// Whether a label for `code` already exists.
    async fn exists(&self, code: &SetCode) -> Result<bool, OutputError>;

    /// Persist `png` as the label for `code`, replacing any existing one.
    /// Returns the final path.
    async fn write(&self, code: &SetCode, png: &[u8]) -> Result<PathBuf, OutputError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_file_name_uses_canonical_code() {
        let code = SetCode::parse("dmu").unwrap();
        assert_eq!(label_file_name(&code), "DMU_label.png");
    }
}
