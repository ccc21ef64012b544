//! Batch orchestrator.
//!
//! Sequences set codes through the acquisition client, symbol resolver,
//! layout engine, renderer and output sink:
//! - **Skip**: existing labels short-circuit before any network work
//! - **Dry run**: everything runs in memory, nothing is written
//! - **Validate**: metadata lookup only
//! - **Parallel**: a fixed pool of workers shares one queue; one failing
//!   code never affects the others

mod config;
mod input;
mod runner;
mod types;

pub use config::{BatchOptions, ExistingLabels, RunMode};
pub use input::{dedupe_codes, parse_code_list, read_code_file, BatchInput, InputError};
pub use runner::{BatchObserver, BatchOrchestrator, NoopObserver};
pub use types::{
    BatchSummary, FailureKind, ItemStage, LabelError, LabelFailure, LabelResult, LabelStatus,
    SkipReason,
};
