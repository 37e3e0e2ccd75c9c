// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.
//!
//! [`FakeRemote`] is an in-memory contents API that hands out a fresh
//! token on every write and enforces the token rules of the real server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use kt_core::encoding::{from_wire, to_wire};

use super::client::ContentsClient;
use super::clock::ClockSource;
use super::context::{RemoteTarget, SyncContext};
use super::gate::GatePolicy;
use super::transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, TransportError, TransportResult,
};

pub const REPO: &str = "alice/notes";

/// 2026-01-01T00:00:00Z
pub const START_MS: u64 = 1_767_225_600_000;

/// Manually driven wall clock.
pub struct MockClock {
    now_ms: AtomicU64,
}

impl MockClock {
    pub fn new(now_ms: u64) -> Self {
        MockClock {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl ClockSource for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

struct RemoteState {
    files: BTreeMap<String, (String, String)>,
    writes: u64,
    remaining: u64,
    limit: u64,
    reset_secs: u64,
    scripted: VecDeque<HttpResponse>,
    failing_deletes: HashSet<String>,
    offline: bool,
    requests: Vec<HttpRequest>,
}

/// In-memory stand-in for the contents API of [`REPO`].
#[derive(Clone)]
pub struct FakeRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemote {
    pub fn new() -> Self {
        FakeRemote {
            state: Arc::new(Mutex::new(RemoteState {
                files: BTreeMap::new(),
                writes: 0,
                remaining: 5000,
                limit: 5000,
                reset_secs: START_MS / 1000 + 3600,
                scripted: VecDeque::new(),
                failing_deletes: HashSet::new(),
                offline: false,
                requests: Vec::new(),
            })),
        }
    }

    /// Stores a file directly, returning its token.
    pub fn insert(&self, path: &str, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let sha = state.next_sha(content);
        state
            .files
            .insert(path.to_string(), (content.to_string(), sha.clone()));
        sha
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|(c, _)| c.clone())
    }

    pub fn token(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|(_, s)| s.clone())
    }

    pub fn paths(&self) -> Vec<String> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    /// Queues a response returned instead of the next routed one.
    pub fn script(&self, response: HttpResponse) {
        self.state.lock().unwrap().scripted.push_back(response);
    }

    /// Makes deletes of `path` fail with a server error.
    pub fn fail_delete(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_deletes
            .insert(path.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Sets the budget reported by subsequent responses.
    pub fn set_budget(&self, remaining: u64, reset_secs: u64) {
        let mut state = self.state.lock().unwrap();
        state.remaining = remaining;
        state.reset_secs = reset_secs;
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    fn handle(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        if state.offline {
            return Err(TransportError::ConnectionFailed("network unreachable".into()));
        }

        let response = match state.scripted.pop_front() {
            Some(response) => response,
            None => state.route(&request),
        };
        state.remaining = state.remaining.saturating_sub(1);
        let mut response = response;
        if response.header("x-ratelimit-remaining").is_none() {
            response = response
                .with_header("X-RateLimit-Remaining", state.remaining.to_string())
                .with_header("X-RateLimit-Limit", state.limit.to_string())
                .with_header("X-RateLimit-Reset", state.reset_secs.to_string());
        }
        Ok(response)
    }
}

impl HttpTransport for FakeRemote {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            // Suspend once per call like a real network round trip
            tokio::task::yield_now().await;
            self.handle(request)
        })
    }
}

fn respond(status: u16, body: Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}

fn not_found() -> HttpResponse {
    respond(404, json!({ "message": "Not Found" }))
}

/// Wraps base64 at 60 columns like the real server.
fn wrap(wire: &str) -> String {
    let mut out = String::new();
    for chunk in wire.as_bytes().chunks(60) {
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl RemoteState {
    fn next_sha(&mut self, content: &str) -> String {
        self.writes += 1;
        let digest = Sha256::digest(format!("{}:{}", self.writes, content).as_bytes());
        hex::encode(&digest[..20])
    }

    fn route(&mut self, request: &HttpRequest) -> HttpResponse {
        let repo = format!("/repos/{REPO}");
        if request.path == repo && request.method == Method::Get {
            return respond(
                200,
                json!({ "full_name": REPO, "private": true, "default_branch": "main" }),
            );
        }
        let Some(rest) = request.path.strip_prefix(&format!("{repo}/contents")) else {
            return not_found();
        };
        let path = rest.trim_start_matches('/').to_string();
        let body = request.body.clone().unwrap_or(Value::Null);
        match request.method {
            Method::Get => self.get(&path),
            Method::Put => self.put(&path, &body),
            Method::Delete => self.delete(&path, &body),
        }
    }

    fn get(&self, path: &str) -> HttpResponse {
        if let Some((content, sha)) = self.files.get(path) {
            return respond(
                200,
                json!({
                    "type": "file",
                    "name": name_of(path),
                    "path": path,
                    "sha": sha,
                    "size": content.len(),
                    "encoding": "base64",
                    "content": wrap(&to_wire(content)),
                }),
            );
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };
        let mut files = Vec::new();
        let mut dirs = BTreeSet::new();
        for (key, (_, sha)) in &self.files {
            let Some(relative) = key.strip_prefix(&prefix) else {
                continue;
            };
            match relative.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(dir.to_string());
                }
                None => files.push(json!({
                    "type": "file",
                    "name": relative,
                    "path": key,
                    "sha": sha,
                })),
            }
        }
        if files.is_empty() && dirs.is_empty() {
            return not_found();
        }
        let mut entries: Vec<Value> = dirs
            .into_iter()
            .map(|dir| {
                json!({
                    "type": "dir",
                    "name": dir,
                    "path": format!("{prefix}{dir}"),
                    "sha": hex::encode(Sha256::digest(dir.as_bytes())),
                })
            })
            .collect();
        entries.extend(files);
        respond(200, Value::Array(entries))
    }

    fn put(&mut self, path: &str, body: &Value) -> HttpResponse {
        let Some(content) = body["content"].as_str().and_then(|w| from_wire(w).ok()) else {
            return respond(400, json!({ "message": "content is not valid base64" }));
        };
        let sent = body.get("sha").and_then(Value::as_str);
        let existing = self.files.get(path).map(|(_, sha)| sha.clone());
        match (existing.as_deref(), sent) {
            (Some(_), None) => {
                return respond(
                    422,
                    json!({ "message": "Invalid request.\n\n\"sha\" wasn't supplied." }),
                )
            }
            (Some(current), Some(sent)) if current != sent => {
                return respond(409, json!({ "message": format!("{path} does not match {sent}") }))
            }
            (None, Some(_)) => return not_found(),
            _ => {}
        }

        let sha = self.next_sha(&content);
        self.files
            .insert(path.to_string(), (content, sha.clone()));
        let status = if existing.is_some() { 200 } else { 201 };
        respond(
            status,
            json!({
                "content": { "name": name_of(path), "path": path, "sha": sha },
                "commit": { "message": body["message"] },
            }),
        )
    }

    fn delete(&mut self, path: &str, body: &Value) -> HttpResponse {
        if self.failing_deletes.contains(path) {
            return respond(500, json!({ "message": "Server Error" }));
        }
        let Some((_, current)) = self.files.get(path) else {
            return not_found();
        };
        if body.get("sha").and_then(Value::as_str) != Some(current.as_str()) {
            return respond(409, json!({ "message": format!("{path} does not match") }));
        }
        self.files.remove(path);
        respond(200, json!({ "content": null, "commit": { "message": body["message"] } }))
    }
}

pub fn target() -> RemoteTarget {
    RemoteTarget {
        repository: REPO.to_string(),
        branch: "main".to_string(),
    }
}

/// Context over a mock clock at [`START_MS`].
pub fn context_with(policy: GatePolicy) -> (Arc<SyncContext>, Arc<MockClock>) {
    let clock = Arc::new(MockClock::new(START_MS));
    let ctx = SyncContext::with_clock(target(), policy, Arc::clone(&clock) as Arc<dyn ClockSource>);
    (Arc::new(ctx), clock)
}

pub fn client_for(remote: &FakeRemote) -> ContentsClient<FakeRemote> {
    let (ctx, _) = context_with(GatePolicy::default());
    ContentsClient::new(remote.clone(), ctx)
}
