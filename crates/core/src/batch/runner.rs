//! Batch orchestrator implementation.
//!
//! Codes go into a shared queue. `parallelism` workers each pull one code,
//! run it to completion and send the result to a single collector, which
//! puts results back into input order once every worker is done.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::catalog::{SetCatalog, SetCode, SetRecord};
use crate::layout::compute_layout;
use crate::output::LabelSink;
use crate::render::render_label;
use crate::symbol::{
    FixedDecision, MissingSymbolDecision, MissingSymbolPrompt, RunContext, SymbolError,
    SymbolImage, SymbolResolver,
};

use super::config::{BatchOptions, RunMode};
use super::input::dedupe_codes;
use super::types::{
    BatchSummary, FailureKind, ItemStage, LabelError, LabelResult, SkipReason,
};

/// Receives progress callbacks while a batch runs.
///
/// Callbacks come from worker tasks and may arrive concurrently.
pub trait BatchObserver: Send + Sync {
    fn batch_started(&self, _total: usize) {}
    fn item_started(&self, _index: usize, _code: &str) {}
    fn item_finished(&self, _index: usize, _result: &LabelResult) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

type Queue = Arc<Mutex<VecDeque<(usize, String)>>>;

/// Drives a list of codes through fetch, symbol, layout, render and write.
pub struct BatchOrchestrator {
    catalog: Arc<dyn SetCatalog>,
    sink: Arc<dyn LabelSink>,
    prompt: Arc<dyn MissingSymbolPrompt>,
    observer: Arc<dyn BatchObserver>,
    options: BatchOptions,
}

impl BatchOrchestrator {
    pub fn new(
        catalog: Arc<dyn SetCatalog>,
        sink: Arc<dyn LabelSink>,
        prompt: Arc<dyn MissingSymbolPrompt>,
        options: BatchOptions,
    ) -> Self {
        Self {
            catalog,
            sink,
            prompt,
            observer: Arc::new(NoopObserver),
            options,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Run a batch with a fresh run context.
    pub async fn run(&self, codes: Vec<String>) -> BatchSummary {
        self.run_with_context(codes, Arc::new(RunContext::new()))
            .await
    }

    /// Run a batch sharing `ctx` for remembered missing-symbol choices.
    pub async fn run_with_context(&self, codes: Vec<String>, ctx: Arc<RunContext>) -> BatchSummary {
        let started = Instant::now();

        let (codes, repeats) = dedupe_codes(codes);
        for repeat in &repeats {
            warn!("Ignoring repeated set code {}", repeat.trim());
        }

        let total = codes.len();
        if total == 0 {
            return BatchSummary::from_results(Vec::new(), started.elapsed());
        }

        let workers = self.options.parallelism.clamp(1, total);
        info!(
            "Processing {} set code(s) with {} worker(s){}",
            total,
            workers,
            match self.options.mode {
                RunMode::Generate => "",
                RunMode::DryRun => " (dry run, nothing will be written)",
                RunMode::Validate => " (validation only)",
            }
        );
        self.observer.batch_started(total);

        let prompt: Arc<dyn MissingSymbolPrompt> = match self.options.mode {
            RunMode::DryRun => Arc::new(FixedDecision::text_only()),
            _ => Arc::clone(&self.prompt),
        };

        let queue: Queue = Arc::new(Mutex::new(
            codes.iter().cloned().enumerate().collect(),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, LabelResult)>();

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let catalog = self.catalog.worker_handle();
            let worker = Worker {
                id,
                resolver: SymbolResolver::new(Arc::clone(&catalog)),
                catalog,
                sink: Arc::clone(&self.sink),
                prompt: Arc::clone(&prompt),
                observer: Arc::clone(&self.observer),
                options: self.options.clone(),
                ctx: Arc::clone(&ctx),
                total,
            };
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            handles.push(tokio::spawn(async move { worker.run(queue, tx).await }));
        }
        drop(tx);

        let mut slots: Vec<Option<LabelResult>> = (0..total).map(|_| None).collect();
        while let Some((index, result)) = rx.recv().await {
            slots[index] = Some(result);
        }

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!("Batch worker stopped unexpectedly: {}", e);
            }
        }

        let results = slots
            .into_iter()
            .zip(codes)
            .map(|(slot, code)| {
                slot.unwrap_or_else(|| {
                    LabelResult::failed(
                        code.trim(),
                        FailureKind::Internal,
                        "worker stopped before finishing this set",
                        std::time::Duration::ZERO,
                    )
                })
            })
            .collect();

        let summary = BatchSummary::from_results(results, started.elapsed());
        info!(
            "Completed in {} ms: {} created, {} skipped, {} failed",
            summary.elapsed_ms, summary.created_count, summary.skipped_count, summary.failed_count
        );
        summary
    }
}

/// Outcome of a successful pass through the pipeline.
enum ItemOutcome {
    Created {
        set_name: String,
        artifact: Option<std::path::PathBuf>,
    },
    Skipped {
        reason: SkipReason,
        set_name: Option<String>,
    },
}

enum SymbolChoice {
    Image(SymbolImage),
    TextOnly,
    Skip,
}

/// Logs stage transitions for one item.
struct StageTracker<'a> {
    code: &'a SetCode,
    stage: ItemStage,
}

impl<'a> StageTracker<'a> {
    fn new(code: &'a SetCode) -> Self {
        Self {
            code,
            stage: ItemStage::Pending,
        }
    }

    fn advance(&mut self, next: ItemStage) {
        debug!("{}: {:?} -> {:?}", self.code, self.stage, next);
        self.stage = next;
    }
}

struct Worker {
    id: usize,
    catalog: Arc<dyn SetCatalog>,
    resolver: SymbolResolver,
    sink: Arc<dyn LabelSink>,
    prompt: Arc<dyn MissingSymbolPrompt>,
    observer: Arc<dyn BatchObserver>,
    options: BatchOptions,
    ctx: Arc<RunContext>,
    total: usize,
}

impl Worker {
    async fn run(self, queue: Queue, results: mpsc::UnboundedSender<(usize, LabelResult)>) {
        loop {
            let next = queue.lock().await.pop_front();
            let Some((index, raw)) = next else {
                break;
            };

            debug!("Worker {} picked up {} ({}/{})", self.id, raw.trim(), index + 1, self.total);
            self.observer.item_started(index, raw.trim());
            let result = self.process(index, &raw).await;
            self.observer.item_finished(index, &result);

            if results.send((index, result)).is_err() {
                break;
            }
        }
    }

    async fn process(&self, index: usize, raw: &str) -> LabelResult {
        let started = Instant::now();

        let code = match SetCode::parse(raw) {
            Ok(code) => code,
            Err(e) => {
                warn!("{}", e);
                return LabelResult::from_error(raw.trim(), &LabelError::from(e), started.elapsed());
            }
        };

        let mut stage = StageTracker::new(&code);
        let result = match self.label(&code, index, &mut stage).await {
            Ok(ItemOutcome::Created { set_name, artifact }) => {
                LabelResult::created(code.as_str(), set_name, artifact, started.elapsed())
            }
            Ok(ItemOutcome::Skipped { reason, set_name }) => {
                LabelResult::skipped(code.as_str(), reason, set_name, started.elapsed())
            }
            Err(e) => {
                warn!("{}: {} ({})", code, e, e.kind());
                LabelResult::from_error(code.as_str(), &e, started.elapsed())
            }
        };
        stage.advance(ItemStage::Done(result.status));
        result
    }

    async fn label(
        &self,
        code: &SetCode,
        index: usize,
        stage: &mut StageTracker<'_>,
    ) -> Result<ItemOutcome, LabelError> {
        if self.options.skips_existing() && self.sink.exists(code).await? {
            debug!("Skipping {}: label already exists", code);
            return Ok(ItemOutcome::Skipped {
                reason: SkipReason::AlreadyExists,
                set_name: None,
            });
        }

        stage.advance(ItemStage::Fetching);
        let record = self.catalog.fetch_set_record(code).await?;

        if self.options.mode == RunMode::Validate {
            info!("{}: {}", code, record.name);
            return Ok(ItemOutcome::Created {
                set_name: record.name,
                artifact: None,
            });
        }

        stage.advance(ItemStage::Resolving);
        let remaining = self.total.saturating_sub(index + 1);
        let symbol = match self.resolve_symbol(&record, remaining).await? {
            SymbolChoice::Image(symbol) => Some(symbol),
            SymbolChoice::TextOnly => None,
            SymbolChoice::Skip => {
                info!("Skipped {}: no symbol", code);
                return Ok(ItemOutcome::Skipped {
                    reason: SkipReason::NoSymbol,
                    set_name: Some(record.name),
                });
            }
        };

        stage.advance(ItemStage::LayingOut);
        let plan = compute_layout(&record, symbol.as_ref(), self.options.canvas)?;
        debug!(
            "{}: name at {}px as {:?}",
            code, plan.name_font_size, plan.name_text
        );

        stage.advance(ItemStage::Rendering);
        let png = render_label(&plan, symbol.as_ref())?;

        if self.options.mode == RunMode::DryRun {
            info!(
                "Would create: {} - {} ({})",
                self.sink.label_path(code).display(),
                record.name,
                record.label_date()
            );
            return Ok(ItemOutcome::Created {
                set_name: record.name,
                artifact: None,
            });
        }

        let path = self.sink.write(code, &png).await?;
        info!(
            "Created label: {} - {}{}",
            path.display(),
            record.name,
            if symbol.is_none() { " (text only)" } else { "" }
        );
        Ok(ItemOutcome::Created {
            set_name: record.name,
            artifact: Some(path),
        })
    }

    async fn resolve_symbol(
        &self,
        record: &SetRecord,
        remaining: usize,
    ) -> Result<SymbolChoice, LabelError> {
        let override_path = self.options.symbol_override.as_deref();
        let reason = match self.resolver.resolve(record, override_path).await {
            Ok(symbol) => return Ok(SymbolChoice::Image(symbol)),
            Err(SymbolError::Missing { reason, .. }) => reason,
            Err(e) => return Err(e.into()),
        };

        warn!("No symbol found for {} ({})", record.code, reason);
        match self.ctx.decide(self.prompt.as_ref(), record, remaining).await {
            MissingSymbolDecision::UseImage(path) => {
                debug!("{}: retrying with {}", record.code, path.display());
                let symbol = self.resolver.resolve(record, Some(&path)).await?;
                Ok(SymbolChoice::Image(symbol))
            }
            MissingSymbolDecision::Skip | MissingSymbolDecision::SkipAll => Ok(SymbolChoice::Skip),
            MissingSymbolDecision::TextOnly | MissingSymbolDecision::TextOnlyAll => {
                Ok(SymbolChoice::TextOnly)
            }
        }
    }
}
