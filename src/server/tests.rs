// End-to-end tests: real listener, real HTTP/1.1 client

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use super::{bind, serve_with_shutdown};
use crate::config::AppState;
use crate::report::{Message, Report, Severity, Validator, ValidatorError};

/// Reports one warning per check, sleeping first and tracking peak concurrency
struct SlowValidator {
    delay: Duration,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowValidator {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl Validator for SlowValidator {
    fn check(&self, path: &Path, report: &mut Report) -> Result<(), ValidatorError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.running.fetch_sub(1, Ordering::SeqCst);

        if path.extension().is_some_and(|ext| ext == "broken") {
            return Err(ValidatorError::Output {
                program: "epubcheck".to_string(),
                detail: "unexpected end of archive".to_string(),
            });
        }

        report.message(Message {
            id: "PKG-012".to_string(),
            severity: Severity::Warning,
            message: "File name contains non-ASCII characters".to_string(),
            additional_locations: 0,
            locations: Vec::new(),
            suggestion: None,
        });
        Ok(())
    }
}

struct Response {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

async fn start(threads: usize, validator: Arc<dyn Validator>) -> SocketAddr {
    let listener = bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::for_tests(threads, validator));
    tokio::spawn(serve_with_shutdown(listener, state, std::future::pending()));
    addr
}

async fn send(
    addr: SocketAddr,
    method: Method,
    body: &str,
) -> Result<Response, hyper::Error> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
    tokio::spawn(conn);

    let req = Request::builder()
        .method(method)
        .uri("/validate")
        .header("Host", addr.to_string())
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap();
    let resp = sender.send_request(req).await?;

    let status = resp.status();
    let content_type = resp
        .headers()
        .get("Content-Type")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = resp.into_body().collect().await?.to_bytes();
    Ok(Response {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    })
}

fn temp_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "epubcheck-server-e2e-{}-{name}",
        std::process::id()
    ));
    std::fs::write(&path, b"PK\x03\x04").unwrap();
    path
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_end_to_end_scenario() {
    let addr = start(4, Arc::new(SlowValidator::new(Duration::ZERO))).await;
    let book = temp_file("book.epub");

    let ok = send(addr, Method::POST, &format!("{}\n", book.display()))
        .await
        .unwrap();
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.content_type.as_deref(), Some("application/json"));
    let report: serde_json::Value = serde_json::from_str(&ok.body).unwrap();
    assert_eq!(report["messages"][0]["ID"], "PKG-012");

    let missing = send(addr, Method::POST, "/tmp/epubcheck-server-e2e-missing.epub")
        .await
        .unwrap();
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        missing.body,
        r#"{ "message": "File not found: /tmp/epubcheck-server-e2e-missing.epub" }"#
    );

    let get = send(addr, Method::GET, "").await.unwrap();
    assert_eq!(get.status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(get.body.is_empty());
    assert!(get.content_type.is_none());

    std::fs::remove_file(&book).ok();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_requests_give_identical_reports() {
    let addr = start(2, Arc::new(SlowValidator::new(Duration::ZERO))).await;
    let book = temp_file("repeat.epub");
    let body = book.display().to_string();

    let first = send(addr, Method::POST, &body).await.unwrap();
    let second = send(addr, Method::POST, &body).await.unwrap();
    std::fs::remove_file(&book).ok();

    let strip = |raw: &str| {
        let mut doc: serde_json::Value = serde_json::from_str(raw).unwrap();
        let checker = doc["checker"].as_object_mut().unwrap();
        checker.remove("checkDate");
        checker.remove("elapsedTime");
        doc
    };
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(strip(&first.body), strip(&second.body));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_within_pool_size() {
    let validator = Arc::new(SlowValidator::new(Duration::from_millis(150)));
    let addr = start(4, Arc::clone(&validator) as Arc<dyn Validator>).await;
    let book = temp_file("concurrent.epub");
    let body = book.display().to_string();

    let requests: Vec<_> = (0..4)
        .map(|_| {
            let body = body.clone();
            tokio::spawn(async move { send(addr, Method::POST, &body).await })
        })
        .collect();
    let missing = send(addr, Method::POST, "/tmp/epubcheck-server-e2e-nope.epub")
        .await
        .unwrap();

    for request in requests {
        let resp = request.await.unwrap().unwrap();
        assert_eq!(resp.status, StatusCode::OK);
    }
    std::fs::remove_file(&book).ok();

    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert!(validator.peak.load(Ordering::SeqCst) <= 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_saturated_pool_queues_requests() {
    let validator = Arc::new(SlowValidator::new(Duration::from_millis(50)));
    let addr = start(2, Arc::clone(&validator) as Arc<dyn Validator>).await;
    let book = temp_file("queued.epub");
    let body = book.display().to_string();

    let requests: Vec<_> = (0..8)
        .map(|_| {
            let body = body.clone();
            tokio::spawn(async move { send(addr, Method::POST, &body).await })
        })
        .collect();
    for request in requests {
        assert_eq!(request.await.unwrap().unwrap().status, StatusCode::OK);
    }
    std::fs::remove_file(&book).ok();

    assert!(validator.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_validator_failure_isolated_to_its_connection() {
    let addr = start(2, Arc::new(SlowValidator::new(Duration::from_millis(50)))).await;
    let broken = temp_file("book.broken");
    let book = temp_file("fine.epub");

    let broken_body = broken.display().to_string();
    let failing = tokio::spawn(async move { send(addr, Method::POST, &broken_body).await });
    let ok = send(addr, Method::POST, &book.display().to_string())
        .await
        .unwrap();

    assert!(failing.await.unwrap().is_err());
    assert_eq!(ok.status, StatusCode::OK);

    // The server keeps accepting after the failure
    let again = send(addr, Method::POST, &book.display().to_string())
        .await
        .unwrap();
    assert_eq!(again.status, StatusCode::OK);

    std::fs::remove_file(&broken).ok();
    std::fs::remove_file(&book).ok();
}
