//! Minimum spacing between upstream requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::RateLimitScope;

/// Enforces a minimum interval between consecutive requests.
///
/// Clones share the same budget; [`RequestSpacer::for_worker`] hands out a
/// fresh budget when the scope is per-worker.
#[derive(Debug, Clone)]
pub struct RequestSpacer {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RequestSpacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// A spacer with no minimum interval.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// The spacer a new batch worker should use under `scope`.
    pub fn for_worker(&self, scope: RateLimitScope) -> Self {
        match scope {
            RateLimitScope::Shared => self.clone(),
            RateLimitScope::PerWorker => Self::new(self.min_interval),
        }
    }

    /// Whether two spacers draw from the same budget.
    pub fn shares_budget_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.last_request, &other.last_request)
    }

    /// Wait until the minimum interval since the previous request has passed.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Request spacing: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
