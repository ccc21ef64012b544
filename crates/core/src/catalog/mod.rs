//! Acquisition client for set metadata and symbol artwork.
//!
//! The [`SetCatalog`] trait is the seam between the batch pipeline and the
//! network. [`ScryfallClient`] implements it over HTTP with bounded
//! exponential backoff ([`RetryPolicy`]) and a minimum spacing between
//! requests ([`RequestSpacer`]).

mod retry;
mod scryfall;
mod spacer;
mod types;

pub use retry::RetryPolicy;
pub use scryfall::ScryfallClient;
pub use spacer::RequestSpacer;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the upstream catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (timeout, connection reset, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a retryable status (5xx or 429).
    #[error("upstream returned HTTP {status}")]
    Status {
        status: u16,
        retry_after: Option<Duration>,
    },

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Response could not be turned into a usable record.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Upstream rejected the request (non-retryable 4xx).
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Every attempt failed with a transient error.
    #[error("gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl CatalogError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !(e.is_builder() || e.is_decode() || e.is_redirect()),
            Self::Status { .. } => true,
            _ => false,
        }
    }

    /// Server-requested wait before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Source of set metadata and symbol artwork.
#[async_trait]
pub trait SetCatalog: Send + Sync {
    /// Fetch metadata for one set.
    async fn fetch_set_record(&self, code: &SetCode) -> Result<SetRecord, CatalogError>;

    /// Download raw symbol image bytes.
    async fn fetch_symbol_bytes(&self, uri: &str) -> Result<Vec<u8>, CatalogError>;

    /// Released sets, newest first, at most `limit` entries.
    async fn recent_sets(&self, limit: usize) -> Result<Vec<SetSummary>, CatalogError>;

    /// Handle used by one batch worker.
    ///
    /// Implementations decide whether the handle shares request spacing
    /// with its siblings.
    fn worker_handle(&self) -> Arc<dyn SetCatalog>;
}
