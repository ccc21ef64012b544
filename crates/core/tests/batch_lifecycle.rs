//! Batch lifecycle integration tests.
//!
//! These tests drive whole batches through the orchestrator with mocked
//! collaborators:
//! pending -> fetching -> resolving -> laying out -> rendering -> created

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use setlabel_core::{
    batch::SkipReason,
    catalog::CatalogError,
    testing::{fixtures, MockCatalog, MockPrompt, MockSink},
    BatchObserver, BatchOptions, BatchOrchestrator, DirectorySink, ExistingLabels, FailureKind,
    FixedDecision, LabelResult, LabelSink, LabelStatus, MissingSymbolDecision, MissingSymbolPrompt,
    RunMode, SetCode,
};

/// Test helper holding the mocks a batch runs against.
struct TestHarness {
    catalog: MockCatalog,
    sink: MockSink,
}

impl TestHarness {
    async fn new() -> Self {
        let catalog = MockCatalog::new();
        for (code, name, year, month) in [
            ("DMU", "Dominaria United", 2022, 9),
            ("BRO", "The Brothers' War", 2022, 11),
            ("ONE", "Phyrexia: All Will Be One", 2023, 2),
            ("MOM", "March of the Machine", 2023, 4),
            ("WOE", "Wilds of Eldraine", 2023, 9),
        ] {
            catalog
                .add_set_with_symbol(
                    fixtures::set_record(code, name, year, month),
                    fixtures::symbol_png(48, 48),
                )
                .await;
        }

        Self {
            catalog,
            sink: MockSink::new(),
        }
    }

    fn orchestrator(&self, options: BatchOptions) -> BatchOrchestrator {
        self.orchestrator_with_prompt(options, Arc::new(FixedDecision::text_only()))
    }

    fn orchestrator_with_prompt(
        &self,
        options: BatchOptions,
        prompt: Arc<dyn MissingSymbolPrompt>,
    ) -> BatchOrchestrator {
        BatchOrchestrator::new(
            Arc::new(self.catalog.clone()),
            Arc::new(self.sink.clone()),
            prompt,
            options,
        )
    }

    /// Register a set that has no symbol available.
    async fn add_symbolless(&self, code: &str, name: &str) {
        self.catalog
            .add_set(fixtures::set_record(code, name, 2024, 2))
            .await;
    }
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

fn code(raw: &str) -> SetCode {
    SetCode::parse(raw).unwrap()
}

#[tokio::test]
async fn test_creates_labels_for_every_code() {
    let harness = TestHarness::new().await;
    let summary = harness
        .orchestrator(BatchOptions::default())
        .run(codes(&["dmu", "BRO", "one"]))
        .await;

    assert_eq!(summary.total_count, 3);
    assert_eq!(summary.created_count, 3);
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.success_rate(), Some(100.0));

    let written = harness.sink.recorded_writes().await;
    assert_eq!(written, vec![code("DMU"), code("BRO"), code("ONE")]);

    let png = harness.sink.written(&code("DMU")).await.unwrap();
    let image = image::load_from_memory(&png).unwrap();
    assert_eq!((image.width(), image.height()), (760, 140));

    let first = &summary.results[0];
    assert_eq!(first.code, "DMU");
    assert_eq!(first.set_name.as_deref(), Some("Dominaria United"));
    assert!(first.artifact.is_some());
}

#[tokio::test]
async fn test_one_bad_code_does_not_affect_others() {
    let harness = TestHarness::new().await;
    let summary = harness
        .orchestrator(BatchOptions::default())
        .run(codes(&["DMU", "XYZ", "BRO", "ONE"]))
        .await;

    assert_eq!(summary.created_count, 3);
    assert_eq!(summary.failed_count, 1);
    assert_eq!(summary.exit_code(), 1);

    let failed = &summary.results[1];
    assert_eq!(failed.code, "XYZ");
    assert_eq!(failed.status, LabelStatus::Failed);
    assert_eq!(failed.error.as_ref().unwrap().kind, FailureKind::NotFound);
    assert_eq!(summary.failures[0].0, "XYZ");
}

#[tokio::test]
async fn test_invalid_code_fails_without_network() {
    let harness = TestHarness::new().await;
    let summary = harness
        .orchestrator(BatchOptions::default())
        .run(codes(&["not a code!", "DMU"]))
        .await;

    assert_eq!(summary.results[0].status, LabelStatus::Failed);
    assert_eq!(
        summary.results[0].error.as_ref().unwrap().kind,
        FailureKind::InvalidCode
    );
    assert_eq!(summary.results[1].status, LabelStatus::Created);
    assert_eq!(
        harness.catalog.recorded_set_fetches().await,
        vec![code("DMU")]
    );
}

#[tokio::test]
async fn test_transient_failure_is_classified() {
    let harness = TestHarness::new().await;
    harness
        .catalog
        .fail_set(
            &code("BRO"),
            CatalogError::RetriesExhausted {
                attempts: 3,
                last_error: "upstream returned HTTP 503".into(),
            },
        )
        .await;

    let summary = harness
        .orchestrator(BatchOptions::default())
        .run(codes(&["DMU", "BRO"]))
        .await;

    let failure = summary.results[1].error.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::TransientNetwork);
    assert!(failure.message.contains("3 attempts"));
}

#[tokio::test]
async fn test_skip_existing_makes_no_catalog_calls() {
    let harness = TestHarness::new().await;
    harness.sink.add_existing(&code("DMU")).await;
    harness.sink.add_existing(&code("BRO")).await;

    let summary = harness
        .orchestrator(BatchOptions::default().with_existing(ExistingLabels::Skip))
        .run(codes(&["DMU", "BRO"]))
        .await;

    assert_eq!(summary.skipped_count, 2);
    assert_eq!(
        summary.results[0].skip_reason,
        Some(SkipReason::AlreadyExists)
    );
    assert_eq!(harness.catalog.call_count().await, 0);
    assert!(harness.sink.recorded_writes().await.is_empty());
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.success_rate(), None);
}

#[tokio::test]
async fn test_force_reprocesses_existing() {
    let harness = TestHarness::new().await;
    harness.sink.add_existing(&code("DMU")).await;

    let summary = harness
        .orchestrator(BatchOptions::default().with_existing(ExistingLabels::Force))
        .run(codes(&["DMU"]))
        .await;

    assert_eq!(summary.created_count, 1);
    assert_eq!(harness.catalog.recorded_set_fetches().await.len(), 1);
    assert_eq!(harness.sink.recorded_writes().await, vec![code("DMU")]);
}

#[tokio::test]
async fn test_dry_run_never_writes() {
    let harness = TestHarness::new().await;
    harness.add_symbolless("MKM", "Murders at Karlov Manor").await;
    let prompt = Arc::new(MockPrompt::new(vec![]));

    let summary = harness
        .orchestrator_with_prompt(
            BatchOptions::default().with_mode(RunMode::DryRun),
            prompt.clone(),
        )
        .run(codes(&["DMU", "MKM"]))
        .await;

    assert_eq!(summary.created_count, 2);
    assert!(summary.results.iter().all(|r| r.artifact.is_none()));
    assert!(harness.sink.recorded_writes().await.is_empty());
    // missing symbol is planned as text-only without asking
    assert_eq!(prompt.prompt_count(), 0);
}

#[tokio::test]
async fn test_dry_run_writes_nothing_to_disk() {
    let harness = TestHarness::new().await;
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("labels");

    let orchestrator = BatchOrchestrator::new(
        Arc::new(harness.catalog.clone()),
        Arc::new(DirectorySink::new(&out)),
        Arc::new(FixedDecision::skip()),
        BatchOptions::default().with_mode(RunMode::DryRun),
    );
    let summary = orchestrator.run(codes(&["DMU", "BRO"])).await;

    assert_eq!(summary.created_count, 2);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_validate_only_fetches_metadata() {
    let harness = TestHarness::new().await;
    let summary = harness
        .orchestrator(BatchOptions::default().with_mode(RunMode::Validate))
        .run(codes(&["DMU", "XYZ"]))
        .await;

    assert_eq!(summary.created_count, 1);
    assert_eq!(summary.failed_count, 1);
    assert_eq!(
        summary.results[0].set_name.as_deref(),
        Some("Dominaria United")
    );
    assert!(harness.catalog.recorded_symbol_fetches().await.is_empty());
    assert!(harness.sink.recorded_writes().await.is_empty());
}

#[tokio::test]
async fn test_parallel_run_keeps_input_order() {
    let harness = TestHarness::new().await;
    harness
        .catalog
        .set_latency(Duration::from_millis(20))
        .await;

    let input = codes(&["WOE", "MOM", "ONE", "BRO", "DMU", "XYZ"]);
    let summary = harness
        .orchestrator(BatchOptions::default().with_parallelism(3))
        .run(input.clone())
        .await;

    let reported: Vec<_> = summary.results.iter().map(|r| r.code.clone()).collect();
    assert_eq!(reported, input);
    assert_eq!(summary.created_count, 5);
    assert_eq!(summary.failed_count, 1);
    assert!(harness.catalog.max_in_flight() > 1);
    assert!(harness.catalog.max_in_flight() <= 3);
    assert_eq!(harness.catalog.worker_handle_count(), 3);
}

#[tokio::test]
async fn test_workers_capped_by_batch_size() {
    let harness = TestHarness::new().await;
    harness
        .orchestrator(BatchOptions::default().with_parallelism(8))
        .run(codes(&["DMU", "BRO"]))
        .await;

    assert_eq!(harness.catalog.worker_handle_count(), 2);
}

#[tokio::test]
async fn test_repeated_codes_processed_once() {
    let harness = TestHarness::new().await;
    let summary = harness
        .orchestrator(BatchOptions::default())
        .run(codes(&["DMU", "dmu", "BRO", "DMU"]))
        .await;

    assert_eq!(summary.total_count, 2);
    assert_eq!(harness.catalog.recorded_set_fetches().await.len(), 2);
}

#[tokio::test]
async fn test_skip_all_is_remembered_for_the_run() {
    let harness = TestHarness::new().await;
    harness.add_symbolless("MKM", "Murders at Karlov Manor").await;
    harness.add_symbolless("OTJ", "Outlaws of Thunder Junction").await;
    harness.add_symbolless("BLB", "Bloomburrow").await;
    let prompt = Arc::new(MockPrompt::new(vec![MissingSymbolDecision::SkipAll]));

    let summary = harness
        .orchestrator_with_prompt(BatchOptions::default(), prompt.clone())
        .run(codes(&["MKM", "DMU", "OTJ", "BLB"]))
        .await;

    assert_eq!(prompt.prompt_count(), 1);
    assert_eq!(prompt.asked_for(), vec![code("MKM")]);
    assert_eq!(summary.created_count, 1);
    assert_eq!(summary.skipped_count, 3);
    assert!(summary
        .results
        .iter()
        .filter(|r| r.status == LabelStatus::Skipped)
        .all(|r| r.skip_reason == Some(SkipReason::NoSymbol)));
}

#[tokio::test]
async fn test_text_only_all_is_remembered_across_workers() {
    let harness = TestHarness::new().await;
    for (c, name) in [("MKM", "Murders"), ("OTJ", "Outlaws"), ("BLB", "Bloomburrow"), ("DSK", "Duskmourn")] {
        harness.add_symbolless(c, name).await;
    }
    let prompt = Arc::new(MockPrompt::new(vec![MissingSymbolDecision::TextOnlyAll]));

    let summary = harness
        .orchestrator_with_prompt(BatchOptions::default().with_parallelism(4), prompt.clone())
        .run(codes(&["MKM", "OTJ", "BLB", "DSK"]))
        .await;

    assert_eq!(prompt.prompt_count(), 1);
    assert_eq!(summary.created_count, 4);
    assert_eq!(harness.sink.recorded_writes().await.len(), 4);
}

#[tokio::test]
async fn test_use_image_decision_retries_with_file() {
    let harness = TestHarness::new().await;
    harness.add_symbolless("MKM", "Murders at Karlov Manor").await;
    let temp = TempDir::new().unwrap();
    let custom = temp.path().join("mkm.png");
    std::fs::write(&custom, fixtures::symbol_png(30, 60)).unwrap();

    let prompt = Arc::new(MockPrompt::new(vec![MissingSymbolDecision::UseImage(
        custom.clone(),
    )]));
    let summary = harness
        .orchestrator_with_prompt(BatchOptions::default(), prompt)
        .run(codes(&["MKM"]))
        .await;

    assert_eq!(summary.created_count, 1);
}

#[tokio::test]
async fn test_bad_replacement_image_fails_item() {
    let harness = TestHarness::new().await;
    harness.add_symbolless("MKM", "Murders at Karlov Manor").await;
    let prompt = Arc::new(MockPrompt::new(vec![MissingSymbolDecision::UseImage(
        "/nonexistent/symbol.png".into(),
    )]));

    let summary = harness
        .orchestrator_with_prompt(BatchOptions::default(), prompt)
        .run(codes(&["MKM", "DMU"]))
        .await;

    assert_eq!(
        summary.results[0].error.as_ref().unwrap().kind,
        FailureKind::Symbol
    );
    assert_eq!(summary.results[1].status, LabelStatus::Created);
}

#[tokio::test]
async fn test_symbol_override_skips_download() {
    let harness = TestHarness::new().await;
    let temp = TempDir::new().unwrap();
    let custom = temp.path().join("custom.png");
    std::fs::write(&custom, fixtures::symbol_png(20, 20)).unwrap();

    let summary = harness
        .orchestrator(BatchOptions::default().with_symbol_override(&custom))
        .run(codes(&["DMU", "BRO"]))
        .await;

    assert_eq!(summary.created_count, 2);
    assert!(harness.catalog.recorded_symbol_fetches().await.is_empty());
}

#[tokio::test]
async fn test_write_failure_is_output_error() {
    let harness = TestHarness::new().await;
    harness.sink.set_fail_writes(true).await;

    let summary = harness
        .orchestrator(BatchOptions::default())
        .run(codes(&["DMU"]))
        .await;

    assert_eq!(
        summary.results[0].error.as_ref().unwrap().kind,
        FailureKind::Output
    );
}

#[tokio::test]
async fn test_writes_labels_to_directory() {
    let harness = TestHarness::new().await;
    let temp = TempDir::new().unwrap();
    let sink = DirectorySink::new(temp.path().join("labels"));

    let orchestrator = BatchOrchestrator::new(
        Arc::new(harness.catalog.clone()),
        Arc::new(sink.clone()),
        Arc::new(FixedDecision::text_only()),
        BatchOptions::default(),
    );
    let summary = orchestrator.run(codes(&["DMU"])).await;

    let expected = temp.path().join("labels/DMU_label.png");
    assert_eq!(summary.results[0].artifact.as_deref(), Some(expected.as_path()));
    assert!(sink.exists(&code("DMU")).await.unwrap());
}

#[derive(Default)]
struct CountingObserver {
    started: AtomicUsize,
    finished: AtomicUsize,
    total: AtomicUsize,
}

impl BatchObserver for CountingObserver {
    fn batch_started(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn item_started(&self, _index: usize, _code: &str) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn item_finished(&self, _index: usize, _result: &LabelResult) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_observer_sees_every_item() {
    let harness = TestHarness::new().await;
    let observer = Arc::new(CountingObserver::default());

    harness
        .orchestrator(BatchOptions::default().with_parallelism(2))
        .with_observer(observer.clone())
        .run(codes(&["DMU", "BRO", "XYZ"]))
        .await;

    assert_eq!(observer.total.load(Ordering::SeqCst), 3);
    assert_eq!(observer.started.load(Ordering::SeqCst), 3);
    assert_eq!(observer.finished.load(Ordering::SeqCst), 3);
}
