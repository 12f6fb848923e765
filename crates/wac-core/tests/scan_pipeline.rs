//! End-to-end pipeline tests against a local mock server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wac_core::{
    run, ConfigError, Credentials, DenyReason, DetectionRules, Finding, ScanConfig, Reporter,
    ScanError, Verdict,
};

// ─────────────────────── helpers ───────────────────────

#[derive(Clone, Default)]
struct Collect(Arc<Mutex<Vec<Finding>>>);

impl Collect {
    fn findings(&self) -> Vec<Finding> {
        self.0.lock().unwrap().clone()
    }

    fn by_url(&self) -> HashMap<String, Verdict> {
        self.findings()
            .into_iter()
            .map(|f| (f.url, f.verdict))
            .collect()
    }
}

impl Reporter for Collect {
    fn report(&mut self, finding: &Finding) {
        self.0.lock().unwrap().push(finding.clone());
    }
}

/// Feed `urls` into a source channel the way the frontend does.
fn source(urls: Vec<String>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        for url in urls {
            if tx.send(url).await.is_err() {
                break;
            }
        }
    });
    rx
}

async fn scan(config: ScanConfig, urls: Vec<String>) -> (Collect, wac_core::ScanSummary) {
    let collect = Collect::default();
    let summary = run(&config, source(urls), collect.clone())
        .await
        .expect("config is valid");
    (collect, summary)
}

fn denied_status(code: u16) -> Verdict {
    Verdict::Denied {
        reason: DenyReason::Status { code },
    }
}

// ─────────────────────── scenarios ───────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_rule_denies_and_grants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let a = format!("{}/a/", server.uri());
    let b = format!("{}/b/", server.uri());
    let config = ScanConfig::new(DetectionRules::new().with_status(401));
    let (collect, summary) = scan(config, vec![a.clone(), b.clone()]).await;

    let lines: Vec<String> = collect.findings().iter().map(ToString::to_string).collect();
    assert!(lines.contains(&format!("[-] {a}: DENIED Status Code (401) returned")));
    assert!(lines.contains(&format!("[+] {b}: GRANTED ACCESS")));
    assert_eq!(summary.denied, 1);
    assert_eq!(summary.granted, 1);
    // Neither body was read by the classifier.
    assert_eq!(summary.released, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redirect_observed_not_followed() {
    let server = MockServer::start().await;
    Mock::given(path("/admin"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
        .mount(&server)
        .await;
    // If the redirect were followed this would turn the verdict into GRANTED.
    Mock::given(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}/admin", server.uri());
    let config = ScanConfig::new(DetectionRules::new().with_redirect("/login"));
    let (collect, _) = scan(config, vec![url.clone()]).await;

    assert_eq!(
        collect.by_url()[&url],
        Verdict::Denied {
            reason: DenyReason::Redirect {
                location: "/login".into()
            }
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_body_rule() {
    let server = MockServer::start().await;
    Mock::given(path("/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>access denied</p>"))
        .mount(&server)
        .await;
    Mock::given(path("/open"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>welcome</p>"))
        .mount(&server)
        .await;

    let secret = format!("{}/secret", server.uri());
    let open = format!("{}/open", server.uri());
    let config = ScanConfig::new(DetectionRules::new().with_body("access denied"));
    let (collect, summary) = scan(config, vec![secret.clone(), open.clone()]).await;

    let verdicts = collect.by_url();
    assert_eq!(
        verdicts[&secret],
        Verdict::Denied {
            reason: DenyReason::Body {
                needle: "access denied".into()
            }
        }
    );
    assert_eq!(verdicts[&open], Verdict::Granted);
    // Both bodies were consumed by the classifier, so cleanup had nothing left.
    assert_eq!(summary.released, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_reported_before_error() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let url = format!("{}/slow", server.uri());
    let config = ScanConfig::new(DetectionRules::new().with_status(401))
        .with_wait(Duration::from_secs(1));
    let (collect, summary) = scan(config, vec![url.clone()]).await;

    let findings = collect.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].verdict, Verdict::Error { timed_out: true });
    assert_eq!(
        findings[0].to_string(),
        format!("[-] {url}: Request timed out\n[!] {url}: Error making request")
    );
    assert_eq!(summary.errors, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_transport_failures_do_not_stop_pipeline() {
    let server = MockServer::start().await;
    Mock::given(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let ok = format!("{}/ok", server.uri());
    let urls = vec![
        "not a url".to_string(),
        "http://127.0.0.1:1/".to_string(),
        ok.clone(),
    ];
    let config = ScanConfig::new(DetectionRules::new().with_status(403)).with_workers(2);
    let (collect, summary) = scan(config, urls).await;

    let verdicts = collect.by_url();
    assert_eq!(verdicts["not a url"], Verdict::Error { timed_out: false });
    assert_eq!(verdicts["http://127.0.0.1:1/"], Verdict::Error { timed_out: false });
    assert_eq!(verdicts[&ok], Verdict::Granted);
    assert_eq!(summary.errors, 2);
    assert_eq!(summary.total(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_one_verdict_per_url_for_any_worker_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let urls: Vec<String> = (0..40).map(|i| format!("{}/page/{i}", server.uri())).collect();

    for workers in [1, 3, 10, 100] {
        let config = ScanConfig::new(DetectionRules::new().with_status(401)).with_workers(workers);
        let (collect, summary) = scan(config, urls.clone()).await;

        let findings = collect.findings();
        assert_eq!(findings.len(), urls.len(), "workers={workers}");
        let verdicts = collect.by_url();
        assert_eq!(verdicts.len(), urls.len(), "each URL exactly once");
        assert!(verdicts.values().all(|v| *v == denied_status(401)));
        assert_eq!(summary.denied, urls.len());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mixed_verdicts_do_not_interfere() {
    let server = MockServer::start().await;
    Mock::given(path("/private"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(path("/public"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut urls = Vec::new();
    for i in 0..20 {
        let p = if i % 2 == 0 { "private" } else { "public" };
        urls.push(format!("{}/{p}?n={i}", server.uri()));
    }

    let config = ScanConfig::new(DetectionRules::new().with_status(401)).with_workers(8);
    let (collect, _) = scan(config, urls).await;

    for (url, verdict) in collect.by_url() {
        if url.contains("/private") {
            assert_eq!(verdict, denied_status(401), "{url}");
        } else {
            assert_eq!(verdict, Verdict::Granted, "{url}");
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cookie_and_basic_auth_sent() {
    let server = MockServer::start().await;
    Mock::given(path("/me"))
        .and(header("Cookie", "session=abc"))
        .and(header("Authorization", "Basic YWRtaW46czNjcmV0"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let url = format!("{}/me", server.uri());
    let creds: Credentials = "admin:s3cret".parse().unwrap();
    let config = ScanConfig::new(DetectionRules::new().with_status(401))
        .with_cookie("session=abc")
        .with_credentials(creds);
    let (collect, _) = scan(config, vec![url.clone()]).await;

    assert_eq!(collect.by_url()[&url], Verdict::Granted);
}

#[tokio::test]
async fn test_empty_source_completes() {
    let config = ScanConfig::new(DetectionRules::new().with_status(401));
    let (collect, summary) = scan(config, Vec::new()).await;
    assert!(collect.findings().is_empty());
    assert_eq!(summary.total(), 0);
}

#[tokio::test]
async fn test_invalid_config_never_starts() {
    let config = ScanConfig::new(DetectionRules::new());
    let collect = Collect::default();
    let result = run(&config, source(vec!["http://a/".into()]), collect.clone()).await;

    assert!(matches!(
        result,
        Err(ScanError::Config(ConfigError::NoDetectionRule))
    ));
    assert!(collect.findings().is_empty());
}

struct Exploding;

impl Reporter for Exploding {
    fn report(&mut self, _finding: &Finding) {
        panic!("reporter failed");
    }
}

#[tokio::test]
async fn test_classifier_panic_fails_the_scan() {
    // An unparseable URL fails without touching the network.
    let config = ScanConfig::new(DetectionRules::new().with_status(401)).with_workers(1);
    let result = run(&config, source(vec!["not a url".into()]), Exploding).await;

    match result {
        Err(ScanError::Stage { stage, source }) => {
            assert_eq!(stage, "classifier");
            assert!(source.is_panic());
        }
        other => panic!("expected a stage failure, got {other:?}"),
    }
}
