//! Full runs of the `setlabel` binary against an in-process fake of the
//! metadata API and symbol host.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_cmd::prelude::*;
use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use setlabel_core::testing::fixtures;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Default)]
struct Hits {
    sets: AtomicUsize,
    symbols: AtomicUsize,
}

fn known_set(code: &str) -> Option<(&'static str, &'static str)> {
    match code {
        "dmu" => Some(("Dominaria United", "2022-09-09")),
        "bro" => Some(("The Brothers' War", "2022-11-18")),
        "nosym" => Some(("Symbolless Promos", "2021-03-03")),
        _ => None,
    }
}

async fn set_handler(State(hits): State<Arc<Hits>>, UrlPath(code): UrlPath<String>) -> Response {
    hits.sets.fetch_add(1, Ordering::SeqCst);
    match known_set(&code) {
        Some((name, released_at)) => Json(json!({
            "code": code,
            "name": name,
            "released_at": released_at,
            "set_type": "expansion"
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_handler() -> Response {
    Json(json!({
        "data": [
            { "code": "dmu", "name": "Dominaria United", "released_at": "2022-09-09", "set_type": "expansion" },
            { "code": "bro", "name": "The Brothers' War", "released_at": "2022-11-18", "set_type": "expansion" }
        ]
    }))
    .into_response()
}

async fn symbol_handler(State(hits): State<Arc<Hits>>, UrlPath(file): UrlPath<String>) -> Response {
    hits.symbols.fetch_add(1, Ordering::SeqCst);
    match file.as_str() {
        "DMU.png" | "BRO.png" => (
            [(header::CONTENT_TYPE, "image/png")],
            fixtures::symbol_png(64, 48),
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

struct Fixture {
    hits: Arc<Hits>,
    dir: TempDir,
    config: PathBuf,
}

impl Fixture {
    async fn start() -> Self {
        let hits = Arc::new(Hits::default());
        let app = Router::new()
            .route("/sets", get(list_handler))
            .route("/sets/{code}", get(set_handler))
            .route("/symbols/{file}", get(symbol_handler))
            .with_state(Arc::clone(&hits));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("setlabel.toml");
        std::fs::write(
            &config,
            format!(
                r#"
[api]
base_url = "http://{addr}"
symbol_url_template = "http://{addr}/symbols/{{code}}.png"
timeout_secs = 5

[retry]
max_attempts = 2
base_delay_ms = 1
max_delay_ms = 5
jitter_ms = 0

[rate_limit]
min_interval_ms = 0
"#
            ),
        )
        .unwrap();

        Self { hits, dir, config }
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.path().join("labels")
    }

    fn codes_file(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("codes.txt");
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Runs the binary off the async runtime so the fake server keeps serving.
    async fn run(&self, args: &[&str]) -> Output {
        let mut full: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        full.push("-c".into());
        full.push(self.config.display().to_string());
        full.push("-o".into());
        full.push(self.output_dir().display().to_string());

        tokio::task::spawn_blocking(move || {
            #[allow(deprecated)]
            let mut cmd = std::process::Command::cargo_bin("setlabel").unwrap();
            cmd.args(&full)
                .env_remove("SETLABEL_CONFIG")
                .env_remove("RUST_LOG")
                .stdin(std::process::Stdio::null())
                .output()
                .unwrap()
        })
        .await
        .unwrap()
    }
}

fn label(dir: &Path, code: &str) -> PathBuf {
    dir.join(format!("{}_label.png", code))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_single_code_creates_label() {
    let fixture = Fixture::start().await;

    let output = fixture.run(&["dmu"]).await;
    output
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created, 0 skipped, 0 failed"));

    let bytes = std::fs::read(label(&fixture.output_dir(), "DMU")).unwrap();
    assert!(bytes.starts_with(PNG_SIGNATURE));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_with_unknown_code_fails_run() {
    let fixture = Fixture::start().await;
    let codes = fixture.codes_file("DMU\nXYZ  # typo\nBRO\n");

    let output = fixture.run(&[codes.to_str().unwrap(), "--no-prompt"]).await;
    output
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2 created, 0 skipped, 1 failed"))
        .stdout(predicate::str::contains("XYZ"));

    assert!(label(&fixture.output_dir(), "DMU").exists());
    assert!(label(&fixture.output_dir(), "BRO").exists());
    assert!(!label(&fixture.output_dir(), "XYZ").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_symbol_without_terminal_is_text_only() {
    let fixture = Fixture::start().await;

    fixture.run(&["NOSYM"]).await.assert().success();
    assert!(label(&fixture.output_dir(), "NOSYM").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_writes_nothing() {
    let fixture = Fixture::start().await;
    let codes = fixture.codes_file("DMU\nBRO\n");

    fixture
        .run(&[codes.to_str().unwrap(), "--dry-run"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("2 would be created"));

    assert!(!fixture.output_dir().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_skip_existing_makes_no_requests() {
    let fixture = Fixture::start().await;
    std::fs::create_dir_all(fixture.output_dir()).unwrap();
    std::fs::write(label(&fixture.output_dir(), "DMU"), b"old").unwrap();

    fixture
        .run(&["DMU", "--skip"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("0 created, 1 skipped"));

    assert_eq!(fixture.hits.sets.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.hits.symbols.load(Ordering::SeqCst), 0);
    assert_eq!(
        std::fs::read(label(&fixture.output_dir(), "DMU")).unwrap(),
        b"old"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_force_replaces_existing() {
    let fixture = Fixture::start().await;
    std::fs::create_dir_all(fixture.output_dir()).unwrap();
    std::fs::write(label(&fixture.output_dir(), "DMU"), b"old").unwrap();

    fixture.run(&["DMU", "--force"]).await.assert().success();

    let bytes = std::fs::read(label(&fixture.output_dir(), "DMU")).unwrap();
    assert!(bytes.starts_with(PNG_SIGNATURE));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_parallel_run_with_yes() {
    let fixture = Fixture::start().await;
    let codes = fixture.codes_file("DMU\nBRO\nNOSYM\n");

    fixture
        .run(&[codes.to_str().unwrap(), "-p", "3", "-y"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("3 created"));

    for code in ["DMU", "BRO", "NOSYM"] {
        assert!(label(&fixture.output_dir(), code).exists(), "{} missing", code);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validate_reports_without_writing() {
    let fixture = Fixture::start().await;
    let codes = fixture.codes_file("DMU\nXYZ\n");

    fixture
        .run(&["--validate", codes.to_str().unwrap()])
        .await
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Valid sets: 1"))
        .stdout(predicate::str::contains("Invalid sets: 1"))
        .stdout(predicate::str::contains("DMU - Dominaria United"));

    assert_eq!(fixture.hits.symbols.load(Ordering::SeqCst), 0);
    assert!(!fixture.output_dir().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_recent() {
    let fixture = Fixture::start().await;

    fixture
        .run(&["--list-recent"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("BRO"))
        .stdout(predicate::str::contains("Dominaria United"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quiet_prints_no_summary() {
    let fixture = Fixture::start().await;

    fixture
        .run(&["DMU", "-q"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
