//! End-to-end tests for both tools against local wiremock servers
//!
//! The library-level tests drive the dispatcher and sampler directly; the
//! binary-level tests run `dupcheck` and `latcmp` as child processes with a
//! clean environment and an empty working directory, so no `.env` leaks in.

use assert_cmd::prelude::*;
use endpoint_probe::{
    client::{HttpProbeClient, ProbeClient},
    executor::Dispatcher,
    models::{DupCheckConfig, LatencyConfig, PortPlan},
    sampler::LatencySampler,
    stats::{analyze, Aggregate},
    types::UserId,
};
use predicates::prelude::*;
use serde_json::json;
use std::{
    process::Command,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

const PROBE_VARS: &[&str] = &[
    "PROBE_HOST",
    "PROBE_PORTS",
    "CREATE_TIMEOUT_SECONDS",
    "MAX_IN_FLIGHT",
    "LATENCY_BASE_URL",
    "SAMPLE_COUNT",
    "LATENCY_TIMEOUT_SECONDS",
    "HEALTH_TIMEOUT_SECONDS",
    "ENABLE_COLOR",
];

/// Hands out consecutive ids starting at 1, echoing the requested name
struct SequentialIds {
    next_id: AtomicI64,
}

impl SequentialIds {
    fn new() -> Self {
        Self { next_id: AtomicI64::new(1) }
    }
}

impl Respond for SequentialIds {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_json(json!({ "id": id, "name": body["name"] }))
    }
}

/// Broken id generator: every response carries the same id
struct ConstantId;

impl Respond for ConstantId {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(json!({ "id": 42, "name": body["name"] }))
    }
}

async fn users_server(responder: impl Respond + 'static) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(responder)
        .mount(&server)
        .await;
    server
}

async fn performance_server(serial_ms: f64, parallel_ms: f64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/performance/test-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 200, "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/performance/process/serial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": { "processingTimeMs": serial_ms }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/performance/process/parallel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "data": { "processingTimeMs": parallel_ms }
        })))
        .mount(&server)
        .await;
    server
}

/// Binary under test with a scrubbed environment in an empty directory
fn probe_cmd(bin: &str, workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(bin).unwrap();
    cmd.current_dir(workdir.path());
    for var in PROBE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

mod dupcheck {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_port_run_has_consecutive_ids() {
        let server = users_server(SequentialIds::new()).await;
        let port = server.address().port();

        let mut config = DupCheckConfig::default();
        config.host = "127.0.0.1".to_string();
        config.ports = PortPlan::from_iter([(port, 10)]);

        let client: Arc<dyn ProbeClient> = Arc::new(HttpProbeClient::new().unwrap());
        let mut seen = 0;
        let summary = Dispatcher::new(client, &config)
            .run(&config.ports, |_| seen += 1)
            .await
            .unwrap();

        assert_eq!(seen, 10);
        assert_eq!(summary.success_count, 10);
        assert_eq!(summary.error_count, 0);

        let Aggregate::Report(report) = analyze(&summary.outcomes) else {
            panic!("expected a report");
        };
        assert!(!report.has_duplicates());
        assert_eq!(report.unique_ids, 10);

        let port_summary = report.port(port).unwrap();
        assert_eq!(port_summary.record_count, 10);
        assert_eq!(port_summary.min_id, UserId(1));
        assert_eq!(port_summary.max_id, UserId(10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicates_across_ports_are_reported() {
        let first = users_server(ConstantId).await;
        let second = users_server(ConstantId).await;

        let mut config = DupCheckConfig::default();
        config.ports = PortPlan::from_iter([(first.address().port(), 2), (second.address().port(), 1)]);

        let client: Arc<dyn ProbeClient> = Arc::new(HttpProbeClient::new().unwrap());
        let summary = Dispatcher::new(client, &config).run(&config.ports, |_| {}).await.unwrap();

        let Aggregate::Report(report) = analyze(&summary.outcomes) else {
            panic!("expected a report");
        };
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].id, UserId(42));
        assert_eq!(report.duplicates[0].occurrences, 3);
        assert_eq!(report.duplicates[0].ports.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_binary_reports_clean_run() {
        let server = users_server(SequentialIds::new()).await;
        let port = server.address().port();
        let workdir = TempDir::new().unwrap();

        let mut cmd = probe_cmd("dupcheck", &workdir);
        let port_arg = format!("{}:10", port);
        cmd.args(["--host", "127.0.0.1", "--port", port_arg.as_str(), "--no-color"]);

        let output = tokio::task::spawn_blocking(move || cmd.output()).await.unwrap().unwrap();
        output
            .assert()
            .success()
            .stdout(predicate::str::contains("Succeeded: 10, Failed: 0"))
            .stdout(predicate::str::contains(format!("port {}: 10 records, id range 1-10", port)))
            .stdout(predicate::str::contains("No duplicate ids"))
            .stdout(predicate::str::contains("Summary: 10 ids, 10 unique ids"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_binary_counts_failures_without_aborting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let port = server.address().port();
        let workdir = TempDir::new().unwrap();

        let mut cmd = probe_cmd("dupcheck", &workdir);
        let port_arg = format!("{}:3", port);
        cmd.args(["--host", "127.0.0.1", "--port", port_arg.as_str(), "--no-color"]);

        let output = tokio::task::spawn_blocking(move || cmd.output()).await.unwrap().unwrap();
        output
            .assert()
            .success()
            .stdout(predicate::str::contains("Succeeded: 0, Failed: 3"))
            .stdout(predicate::str::contains("HTTP 503"))
            .stdout(predicate::str::contains("No successful requests"));
    }

    #[test]
    fn test_binary_rejects_malformed_port_entry() {
        let workdir = TempDir::new().unwrap();
        probe_cmd("dupcheck", &workdir)
            .args(["--port", "10001"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("PORT:COUNT"));
    }
}

mod latcmp {
    use super::*;

    #[tokio::test]
    async fn test_sampler_against_mock_api() {
        let server = performance_server(710.0, 300.0).await;

        let mut config = LatencyConfig::default();
        config.base_url = format!("{}/api/performance", server.uri());
        config.sample_count = 3;

        let client: Arc<dyn ProbeClient> = Arc::new(HttpProbeClient::new().unwrap());
        let run = LatencySampler::new(client, &config).run(|_| {}).await.unwrap();

        assert_eq!(run.serial.samples.len(), 3);
        assert_eq!(run.parallel.samples.len(), 3);

        let comparison = run.comparison().unwrap();
        assert!((comparison.improvement_pct - 57.746).abs() < 0.01);
        assert!(comparison.parallel_is_faster());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_binary_prints_comparison() {
        let server = performance_server(710.0, 300.0).await;
        let workdir = TempDir::new().unwrap();

        let base_url = format!("{}/api/performance", server.uri());
        let mut cmd = probe_cmd("latcmp", &workdir);
        cmd.args([
            "--base-url",
            base_url.as_str(),
            "--samples",
            "2",
            "--no-pause",
            "--no-color",
        ]);

        let output = tokio::task::spawn_blocking(move || cmd.output()).await.unwrap().unwrap();
        output
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"(?s)SUCCESS: Server connection OK.*\[1/2\] Serial processing").unwrap())
            .stdout(predicate::str::contains("[1/2] Serial processing..."))
            .stdout(predicate::str::contains("[2/2] Parallel processing..."))
            .stdout(predicate::str::contains("Serial average:     710 ms"))
            .stdout(predicate::str::contains("Improvement:        57.7%"))
            .stdout(predicate::str::contains("Parallel processing is 57.7% faster than serial"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_binary_fails_when_api_is_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/performance/test-data"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let workdir = TempDir::new().unwrap();

        let base_url = format!("{}/api/performance", server.uri());
        let mut cmd = probe_cmd("latcmp", &workdir);
        cmd.args([
            "--base-url",
            base_url.as_str(),
            "--no-pause",
            "--no-color",
        ]);

        let output = tokio::task::spawn_blocking(move || cmd.output()).await.unwrap().unwrap();
        output
            .assert()
            .failure()
            .stderr(predicate::str::contains("test-data"))
            .stdout(predicate::str::contains("Server connection OK").not())
            .stdout(predicate::str::contains("Serial processing").not());
    }

    #[test]
    fn test_binary_rejects_sample_count_out_of_range() {
        let workdir = TempDir::new().unwrap();
        probe_cmd("latcmp", &workdir)
            .args(["--samples", "0", "--no-pause"])
            .assert()
            .failure();
    }
}
