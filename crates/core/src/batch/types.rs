//! Types for the batch orchestrator.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{CatalogError, InvalidSetCode};
use crate::layout::LayoutError;
use crate::output::OutputError;
use crate::render::RenderError;
use crate::symbol::SymbolError;

/// Stage an item is in while it moves through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    Pending,
    Fetching,
    Resolving,
    LayingOut,
    Rendering,
    Done(LabelStatus),
}

/// Terminal outcome of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStatus {
    Created,
    Skipped,
    Failed,
}

/// Why an item was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A label already exists and existing labels are kept.
    AlreadyExists,
    /// No symbol was available and the choice was to skip.
    NoSymbol,
}

/// Classification of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    TransientNetwork,
    MalformedResponse,
    Upstream,
    InvalidCode,
    SymbolMissing,
    Symbol,
    Layout,
    Render,
    Output,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::TransientNetwork => "network",
            Self::MalformedResponse => "malformed response",
            Self::Upstream => "upstream error",
            Self::InvalidCode => "invalid code",
            Self::SymbolMissing => "symbol missing",
            Self::Symbol => "symbol",
            Self::Layout => "layout",
            Self::Render => "render",
            Self::Output => "output",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can fail while producing one label.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error(transparent)]
    InvalidCode(#[from] InvalidSetCode),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl LabelError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidCode(_) => FailureKind::InvalidCode,
            Self::Catalog(e) => match e {
                CatalogError::NotFound(_) => FailureKind::NotFound,
                CatalogError::Malformed(_) => FailureKind::MalformedResponse,
                CatalogError::Api { .. } => FailureKind::Upstream,
                CatalogError::RetriesExhausted { .. }
                | CatalogError::Http(_)
                | CatalogError::Status { .. } => FailureKind::TransientNetwork,
            },
            Self::Symbol(SymbolError::Missing { .. }) => FailureKind::SymbolMissing,
            Self::Symbol(SymbolError::Override { .. }) => FailureKind::Symbol,
            Self::Layout(_) => FailureKind::Layout,
            Self::Render(_) => FailureKind::Render,
            Self::Output(_) => FailureKind::Output,
        }
    }
}

/// Recorded failure of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one item in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct LabelResult {
    /// Canonical code, or the input as given when it was not a valid code.
    pub code: String,
    pub status: LabelStatus,
    pub error: Option<LabelFailure>,
    pub skip_reason: Option<SkipReason>,
    pub duration_ms: u64,
    pub set_name: Option<String>,
    /// Written label, absent for dry runs and validation.
    pub artifact: Option<PathBuf>,
}

impl LabelResult {
    pub fn created(
        code: impl Into<String>,
        set_name: String,
        artifact: Option<PathBuf>,
        duration: Duration,
    ) -> Self {
        Self {
            code: code.into(),
            status: LabelStatus::Created,
            error: None,
            skip_reason: None,
            duration_ms: duration.as_millis() as u64,
            set_name: Some(set_name),
            artifact,
        }
    }

    pub fn skipped(
        code: impl Into<String>,
        reason: SkipReason,
        set_name: Option<String>,
        duration: Duration,
    ) -> Self {
        Self {
            code: code.into(),
            status: LabelStatus::Skipped,
            error: None,
            skip_reason: Some(reason),
            duration_ms: duration.as_millis() as u64,
            set_name,
            artifact: None,
        }
    }

    pub fn failed(
        code: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            code: code.into(),
            status: LabelStatus::Failed,
            error: Some(LabelFailure {
                kind,
                message: message.into(),
            }),
            skip_reason: None,
            duration_ms: duration.as_millis() as u64,
            set_name: None,
            artifact: None,
        }
    }

    pub fn from_error(code: impl Into<String>, error: &LabelError, duration: Duration) -> Self {
        Self::failed(code, error.kind(), error.to_string(), duration)
    }

    pub fn is_failure(&self) -> bool {
        self.status == LabelStatus::Failed
    }

    /// Whether this item produced (or in a dry run would produce) a label.
    pub fn is_created(&self) -> bool {
        self.status == LabelStatus::Created
    }
}

/// Aggregate outcome of a batch run. Results are in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total_count: usize,
    pub created_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    /// `(code, reason)` for every failed item.
    pub failures: Vec<(String, String)>,
    pub results: Vec<LabelResult>,
    pub elapsed_ms: u64,
}

impl BatchSummary {
    pub fn from_results(results: Vec<LabelResult>, elapsed: Duration) -> Self {
        let mut summary = Self {
            total_count: results.len(),
            elapsed_ms: elapsed.as_millis() as u64,
            ..Self::default()
        };

        for result in &results {
            match result.status {
                LabelStatus::Created => summary.created_count += 1,
                LabelStatus::Skipped => summary.skipped_count += 1,
                LabelStatus::Failed => {
                    summary.failed_count += 1;
                    let reason = result
                        .error
                        .as_ref()
                        .map(|e| e.message.clone())
                        .unwrap_or_default();
                    summary.failures.push((result.code.clone(), reason));
                }
            }
        }

        summary.results = results;
        summary
    }

    /// Percentage of attempted items that were created. Skipped items are
    /// not attempts. `None` when nothing was attempted.
    pub fn success_rate(&self) -> Option<f64> {
        let attempted = self.created_count + self.failed_count;
        if attempted == 0 {
            None
        } else {
            Some(self.created_count as f64 * 100.0 / attempted as f64)
        }
    }

    /// Process exit status for this run.
    pub fn exit_code(&self) -> i32 {
        if self.failed_count == 0 {
            0
        } else {
            1
        }
    }
}
