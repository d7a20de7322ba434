//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use notif::check::{CheckObservation, CheckStatus, IgnoreList};
use notif::notifier::{Alert, Notifier, NotifierError, NotifierResponse, NotifierResult};
use notif::processor::{AlertFormatter, Processor};
use notif::store::{CheckStateStore, LockHandle, MemoryStore, StateStore, StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Mock HTTP server
// ---------------------------------------------------------------------------

/// One request received by a mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string.
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Canned response from a mock server.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

pub type Requests = Arc<Mutex<Vec<RecordedRequest>>>;

/// Start a programmable mock server on an ephemeral port.
///
/// Every request is recorded before `f` produces the response.
pub async fn start_programmable_server<F>(f: F) -> (SocketAddr, Requests)
where
    F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let f = f.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let Some(req) = read_request(&mut socket).await else {
                    return;
                };
                recorded.lock().unwrap().push(req.clone());
                let resp = f(&req);

                let mut head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                    resp.status,
                    reason(resp.status),
                    resp.body.len()
                );
                for (k, v) in &resp.headers {
                    head.push_str(&format!("{}: {}\r\n", k, v));
                }
                head.push_str("\r\n");

                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&resp.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, requests)
}

/// Start a mock server that always answers with `status` and `body`.
pub async fn start_fixed_server(status: u16, body: &'static str) -> (SocketAddr, Requests) {
    start_programmable_server(move |_| MockResponse::new(status, body)).await
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Notifier that counts calls and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    raised: AtomicUsize,
    cleared: AtomicUsize,
    fail: AtomicBool,
    pub keys: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn raised(&self) -> usize {
        self.raised.load(Ordering::SeqCst)
    }

    pub fn cleared(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn respond(&self, incident_key: &str) -> NotifierResult<NotifierResponse> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifierError::Status {
                status: 503,
                body: "backend down".into(),
            });
        }
        self.keys.lock().unwrap().push(incident_key.to_string());
        Ok(NotifierResponse {
            status: "success".into(),
            message: String::new(),
            incident_key: incident_key.into(),
        })
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn raise_alert(&self, incident_key: &str, _alert: &Alert) -> NotifierResult<NotifierResponse> {
        let resp = self.respond(incident_key)?;
        self.raised.fetch_add(1, Ordering::SeqCst);
        Ok(resp)
    }

    async fn clear_alert(&self, incident_key: &str, _alert: &Alert) -> NotifierResult<NotifierResponse> {
        let resp = self.respond(incident_key)?;
        self.cleared.fetch_add(1, Ordering::SeqCst);
        Ok(resp)
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Store wrapper with switchable failures.
#[derive(Debug)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_get: AtomicBool,
    pub fail_put: AtomicBool,
    pub fail_lock: AtomicBool,
    pub releases: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(Duration::from_millis(200)),
            fail_get: AtomicBool::new(false),
            fail_put: AtomicBool::new(false),
            fail_lock: AtomicBool::new(false),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".into()));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".into()));
        }
        self.inner.put(key, value).await
    }

    async fn lock(&self, lock_key: &str) -> StoreResult<Box<dyn LockHandle>> {
        if self.fail_lock.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".into()));
        }
        Ok(Box::new(CountingLock {
            inner: self.inner.lock(lock_key).await?,
            releases: self.releases.clone(),
        }))
    }
}

struct CountingLock {
    inner: Box<dyn LockHandle>,
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl LockHandle for CountingLock {
    fn key(&self) -> &str {
        self.inner.key()
    }

    async fn release(self: Box<Self>) -> StoreResult<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release().await
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn processor_with(store: Arc<dyn StateStore>, notifier: Arc<RecordingNotifier>) -> Processor {
    Processor::new(
        CheckStateStore::new(store),
        notifier,
        IgnoreList::default(),
        AlertFormatter::new("http://127.0.0.1:8500/ui/#/dc1/nodes/{node}"),
    )
}

pub fn observation(node: &str, check_id: &str, status: &str) -> CheckObservation {
    let mut obs = CheckObservation::new(node, check_id, CheckStatus::from(status));
    obs.service_name = "web".into();
    obs.check_name = "HTTP check".into();
    obs.output = "output".into();
    obs
}
