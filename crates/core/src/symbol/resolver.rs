//! Symbol source selection.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{SymbolError, SymbolImage};
use crate::catalog::{SetCatalog, SetRecord};

/// Picks the symbol for a set: the user override when given, otherwise the
/// artwork referenced by the record.
pub struct SymbolResolver {
    catalog: Arc<dyn SetCatalog>,
}

impl SymbolResolver {
    pub fn new(catalog: Arc<dyn SetCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve a normalized symbol.
    ///
    /// An override path never touches the network and any failure to use it
    /// is an [`SymbolError::Override`]. Download problems of any kind are
    /// reported as [`SymbolError::Missing`] so the caller can fall back.
    pub async fn resolve(
        &self,
        record: &SetRecord,
        override_path: Option<&Path>,
    ) -> Result<SymbolImage, SymbolError> {
        if let Some(path) = override_path {
            debug!("{}: using symbol override {}", record.code, path.display());
            return load_override(path).await;
        }

        let Some(uri) = record.symbol_uri.as_deref() else {
            return Err(SymbolError::Missing {
                code: record.code.clone(),
                reason: "no symbol source configured".to_string(),
            });
        };

        debug!("{}: downloading symbol from {}", record.code, uri);
        let bytes = match self.catalog.fetch_symbol_bytes(uri).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{}: symbol download failed: {}", record.code, e);
                return Err(SymbolError::Missing {
                    code: record.code.clone(),
                    reason: e.to_string(),
                });
            }
        };

        SymbolImage::from_bytes(&bytes).map_err(|e| {
            warn!("{}: downloaded symbol unusable: {}", record.code, e);
            SymbolError::Missing {
                code: record.code.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Read and normalize a user-supplied symbol file.
pub async fn load_override(path: &Path) -> Result<SymbolImage, SymbolError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SymbolError::Override {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    SymbolImage::from_bytes(&bytes).map_err(|e| SymbolError::Override {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
