//! Mock set catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, SetCatalog, SetCode, SetRecord, SetSummary};

/// Mock implementation of the SetCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Serve configured set records and symbol bytes
/// - Unknown codes and URIs answer `NotFound`
/// - Inject one-shot errors per code or URI
/// - Record every fetch for assertions
/// - Simulate latency and track peak concurrency
///
/// Clones, including worker handles, share all state.
///
/// # Example
///
/// ```rust,ignore
/// use setlabel_core::testing::{fixtures, MockCatalog};
///
/// let catalog = MockCatalog::new();
/// catalog.add_set(fixtures::set_record("DMU", "Dominaria United", 2022, 9)).await;
///
/// let record = catalog.fetch_set_record(&"DMU".parse()?).await?;
/// assert_eq!(catalog.recorded_set_fetches().await.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockCatalog {
    /// Set records by code.
    sets: Arc<RwLock<HashMap<SetCode, SetRecord>>>,
    /// Symbol bytes by URI.
    symbols: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Entries returned by `recent_sets`.
    recent: Arc<RwLock<Vec<SetSummary>>>,
    /// One-shot errors for set lookups.
    set_errors: Arc<RwLock<HashMap<SetCode, CatalogError>>>,
    /// One-shot errors for symbol downloads.
    symbol_errors: Arc<RwLock<HashMap<String, CatalogError>>>,
    /// Recorded set lookups.
    set_fetches: Arc<RwLock<Vec<SetCode>>>,
    /// Recorded symbol downloads.
    symbol_fetches: Arc<RwLock<Vec<String>>>,
    /// Delay applied to every call.
    latency: Arc<RwLock<Duration>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    worker_handles: Arc<AtomicUsize>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            sets: Arc::new(RwLock::new(HashMap::new())),
            symbols: Arc::new(RwLock::new(HashMap::new())),
            recent: Arc::new(RwLock::new(Vec::new())),
            set_errors: Arc::new(RwLock::new(HashMap::new())),
            symbol_errors: Arc::new(RwLock::new(HashMap::new())),
            set_fetches: Arc::new(RwLock::new(Vec::new())),
            symbol_fetches: Arc::new(RwLock::new(Vec::new())),
            latency: Arc::new(RwLock::new(Duration::ZERO)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            worker_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add a set record.
    pub async fn add_set(&self, record: SetRecord) {
        self.sets.write().await.insert(record.code.clone(), record);
    }

    /// Add a set record together with a symbol served at its `symbol_uri`.
    pub async fn add_set_with_symbol(&self, record: SetRecord, symbol: Vec<u8>) {
        if let Some(uri) = &record.symbol_uri {
            self.add_symbol(uri, symbol).await;
        }
        self.add_set(record).await;
    }

    /// Serve `bytes` for `uri`.
    pub async fn add_symbol(&self, uri: &str, bytes: Vec<u8>) {
        self.symbols.write().await.insert(uri.to_string(), bytes);
    }

    /// Set the recent-sets listing.
    pub async fn set_recent(&self, sets: Vec<SetSummary>) {
        *self.recent.write().await = sets;
    }

    /// Fail the next lookup of `code` with `error`.
    pub async fn fail_set(&self, code: &SetCode, error: CatalogError) {
        self.set_errors.write().await.insert(code.clone(), error);
    }

    /// Fail the next download of `uri` with `error`.
    pub async fn fail_symbol(&self, uri: &str, error: CatalogError) {
        self.symbol_errors
            .write()
            .await
            .insert(uri.to_string(), error);
    }

    /// Delay every call by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// All recorded set lookups, in call order.
    pub async fn recorded_set_fetches(&self) -> Vec<SetCode> {
        self.set_fetches.read().await.clone()
    }

    /// All recorded symbol downloads, in call order.
    pub async fn recorded_symbol_fetches(&self) -> Vec<String> {
        self.symbol_fetches.read().await.clone()
    }

    /// Total number of calls of any kind.
    pub async fn call_count(&self) -> usize {
        self.set_fetches.read().await.len() + self.symbol_fetches.read().await.len()
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of worker handles handed out.
    pub fn worker_handle_count(&self) -> usize {
        self.worker_handles.load(Ordering::SeqCst)
    }

    async fn simulate_call(&self) -> InFlight {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));

        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        guard
    }
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SetCatalog for MockCatalog {
    async fn fetch_set_record(&self, code: &SetCode) -> Result<SetRecord, CatalogError> {
        self.set_fetches.write().await.push(code.clone());
        let _call = self.simulate_call().await;

        if let Some(error) = self.set_errors.write().await.remove(code) {
            return Err(error);
        }

        self.sets
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("set '{}'", code)))
    }

    async fn fetch_symbol_bytes(&self, uri: &str) -> Result<Vec<u8>, CatalogError> {
        self.symbol_fetches.write().await.push(uri.to_string());
        let _call = self.simulate_call().await;

        if let Some(error) = self.symbol_errors.write().await.remove(uri) {
            return Err(error);
        }

        self.symbols
            .read()
            .await
            .get(uri)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("symbol {}", uri)))
    }

    async fn recent_sets(&self, limit: usize) -> Result<Vec<SetSummary>, CatalogError> {
        let recent = self.recent.read().await;
        Ok(recent.iter().take(limit).cloned().collect())
    }

    fn worker_handle(&self) -> Arc<dyn SetCatalog> {
        self.worker_handles.fetch_add(1, Ordering::SeqCst);
        Arc::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_serves_configured_set() {
        let catalog = MockCatalog::new();
        catalog
            .add_set(fixtures::set_record("DMU", "Dominaria United", 2022, 9))
            .await;

        let code = SetCode::parse("dmu").unwrap();
        let record = catalog.fetch_set_record(&code).await.unwrap();
        assert_eq!(record.name, "Dominaria United");
        assert_eq!(catalog.recorded_set_fetches().await, vec![code]);
    }

    #[tokio::test]
    async fn test_unknown_set_is_not_found() {
        let catalog = MockCatalog::new();
        let code = SetCode::parse("XYZ").unwrap();
        let result = catalog.fetch_set_record(&code).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_injected_error_is_one_shot() {
        let catalog = MockCatalog::new();
        catalog
            .add_set(fixtures::set_record("DMU", "Dominaria United", 2022, 9))
            .await;
        let code = SetCode::parse("DMU").unwrap();
        catalog
            .fail_set(&code, CatalogError::Malformed("bad".into()))
            .await;

        assert!(catalog.fetch_set_record(&code).await.is_err());
        assert!(catalog.fetch_set_record(&code).await.is_ok());
    }

    #[tokio::test]
    async fn test_worker_handles_share_state() {
        let catalog = MockCatalog::new();
        let handle = catalog.worker_handle();
        let code = SetCode::parse("ABC").unwrap();
        let _ = handle.fetch_set_record(&code).await;

        assert_eq!(catalog.recorded_set_fetches().await.len(), 1);
        assert_eq!(catalog.worker_handle_count(), 1);
    }
}
