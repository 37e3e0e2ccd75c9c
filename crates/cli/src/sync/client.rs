// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the remote contents API.
//!
//! Provides versioned object CRUD addressed by path:
//! - every call is admitted by the rate gate and its response classified
//! - writes to an existing object carry its concurrency token; a write
//!   without a token only creates
//! - [`ContentsClient::upload`] performs the read-modify-write cycle

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use kt_core::encoding::{from_wire, from_wire_lossy, to_wire};

use super::context::SyncContext;
use super::response::{classify, RemoteError};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Repository metadata returned by the reachability probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryInfo {
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// A fetched object with its decoded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub path: String,
    pub token: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks and submodules.
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectEntry {
    pub path: String,
    pub name: String,
    #[serde(rename = "sha")]
    pub token: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// What a write to a path has to do, given its current remote version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// Nothing exists at the path yet.
    Create,
    /// The path exists with this token and different content.
    Update(String),
    /// The path already holds identical content.
    Unchanged(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Created { token: String },
    Updated { token: String },
    Unchanged,
}

#[derive(Deserialize)]
struct FileBody {
    path: String,
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct WriteBody {
    content: WrittenContent,
}

#[derive(Deserialize)]
struct WrittenContent {
    sha: String,
}

fn parse<T: serde::de::DeserializeOwned>(response: &HttpResponse, subject: &str) -> RemoteResult<T> {
    serde_json::from_str(&response.body)
        .map_err(|e| RemoteError::Network(format!("unexpected response for {subject}: {e}")))
}

/// Contents API client over an injectable transport.
pub struct ContentsClient<T: HttpTransport> {
    transport: T,
    ctx: Arc<SyncContext>,
}

impl<T: HttpTransport> ContentsClient<T> {
    pub fn new(transport: T, ctx: Arc<SyncContext>) -> Self {
        ContentsClient { transport, ctx }
    }

    pub fn context(&self) -> &Arc<SyncContext> {
        &self.ctx
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}", self.ctx.target.repository)
    }

    fn contents_path(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{}/contents", self.repo_path())
        } else {
            format!("{}/contents/{}", self.repo_path(), path)
        }
    }

    async fn execute(
        &self,
        request: HttpRequest,
        subject: &str,
        sent_token: bool,
    ) -> RemoteResult<HttpResponse> {
        self.ctx.gate.admit().await?;
        tracing::debug!(method = %request.method, path = %request.path, "remote request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let budget = self.ctx.gate.record(&response).await;
        tracing::debug!(
            status = response.status,
            remaining = budget.remaining,
            "remote response"
        );
        classify(response, subject, sent_token, budget)
    }

    /// Checks credential and repository reachability with one read.
    pub async fn probe_repository(&self) -> RemoteResult<RepositoryInfo> {
        let subject = self.ctx.target.repository.as_str();
        let request = HttpRequest::new(Method::Get, self.repo_path());
        let response = self.execute(request, subject, false).await?;
        parse(&response, subject)
    }

    async fn fetch(&self, path: &str, lossy: bool) -> RemoteResult<RemoteObject> {
        let request = HttpRequest::new(Method::Get, self.contents_path(path))
            .query("ref", &self.ctx.target.branch);
        let response = self.execute(request, path, false).await?;
        let body: FileBody = parse(&response, path)?;

        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(RemoteError::Encoding(format!(
                    "unsupported content encoding '{encoding}' for {path}"
                )));
            }
        }
        let wire = body.content.unwrap_or_default();
        let content = if lossy {
            from_wire_lossy(&wire)?
        } else {
            from_wire(&wire)?
        };

        self.ctx.cache.put(path, &body.sha, &content);
        Ok(RemoteObject {
            path: body.path,
            token: body.sha,
            content,
        })
    }

    /// Fetches an object. Always hits the server.
    pub async fn get_object(&self, path: &str) -> RemoteResult<RemoteObject> {
        self.fetch(path, false).await
    }

    /// Fetches an object written by clients that encoded text per byte.
    pub async fn get_object_lossy(&self, path: &str) -> RemoteResult<RemoteObject> {
        self.fetch(path, true).await
    }

    /// Writes an object and returns its new token.
    ///
    /// With a token this is a conditional update; without one it only
    /// creates, failing with `AlreadyExists` if the path is occupied.
    pub async fn put_object(
        &self,
        path: &str,
        content: &str,
        token: Option<&str>,
        message: &str,
    ) -> RemoteResult<String> {
        let mut body = json!({
            "message": message,
            "content": to_wire(content),
            "branch": self.ctx.target.branch,
        });
        if let Some(token) = token {
            body["sha"] = json!(token);
        }
        let request = HttpRequest::new(Method::Put, self.contents_path(path)).json(body);

        match self.execute(request, path, token.is_some()).await {
            Ok(response) => {
                let written: WriteBody = parse(&response, path)?;
                self.ctx.cache.put(path, &written.content.sha, content);
                Ok(written.content.sha)
            }
            Err(e) => {
                if matches!(e, RemoteError::ConcurrencyConflict(_) | RemoteError::NotFound(_)) {
                    self.ctx.cache.evict(path);
                }
                Err(e)
            }
        }
    }

    /// Deletes an object at the given version.
    pub async fn delete_object(&self, path: &str, token: &str, message: &str) -> RemoteResult<()> {
        let body = json!({
            "message": message,
            "sha": token,
            "branch": self.ctx.target.branch,
        });
        let request = HttpRequest::new(Method::Delete, self.contents_path(path)).json(body);
        let result = self.execute(request, path, true).await.map(|_| ());
        if !matches!(result, Err(RemoteError::Network(_) | RemoteError::RateLimitExceeded { .. })) {
            self.ctx.cache.evict(path);
        }
        result
    }

    /// Lists the entries of a directory (`""` for the repository root).
    pub async fn list_objects(&self, dir: &str) -> RemoteResult<Vec<ObjectEntry>> {
        let subject = if dir.is_empty() { "/" } else { dir };
        let request = HttpRequest::new(Method::Get, self.contents_path(dir))
            .query("ref", &self.ctx.target.branch);
        let response = self.execute(request, subject, false).await?;
        parse(&response, subject)
    }

    /// Determines how `content` has to be written to `path`.
    ///
    /// Consults the cache first, then the server. A missing object means
    /// the write creates it.
    pub async fn resolve_version(&self, path: &str, content: &str) -> RemoteResult<VersionCheck> {
        self.resolve_version_with(path, content, |a, b| a == b).await
    }

    /// Like [`resolve_version`](Self::resolve_version), with `same` deciding
    /// whether the stored content already matches `content`.
    pub async fn resolve_version_with(
        &self,
        path: &str,
        content: &str,
        same: impl Fn(&str, &str) -> bool,
    ) -> RemoteResult<VersionCheck> {
        if let Some(entry) = self.ctx.cache.get(path) {
            tracing::debug!(path, "version resolved from cache");
            return Ok(if same(&entry.content, content) {
                VersionCheck::Unchanged(entry.token)
            } else {
                VersionCheck::Update(entry.token)
            });
        }
        match self.fetch(path, true).await {
            Ok(object) if same(&object.content, content) => Ok(VersionCheck::Unchanged(object.token)),
            Ok(object) => Ok(VersionCheck::Update(object.token)),
            Err(RemoteError::NotFound(_)) => Ok(VersionCheck::Create),
            Err(e) => Err(e),
        }
    }

    /// Writes `content` according to a previous [`resolve_version`](Self::resolve_version).
    pub async fn write_resolved(
        &self,
        path: &str,
        content: &str,
        check: VersionCheck,
        message: &str,
    ) -> RemoteResult<UploadOutcome> {
        match check {
            VersionCheck::Unchanged(_) => {
                tracing::debug!(path, "content unchanged, skipping write");
                Ok(UploadOutcome::Unchanged)
            }
            VersionCheck::Create => {
                let token = self.put_object(path, content, None, message).await?;
                Ok(UploadOutcome::Created { token })
            }
            VersionCheck::Update(current) => {
                let token = self.put_object(path, content, Some(&current), message).await?;
                Ok(UploadOutcome::Updated { token })
            }
        }
    }

    /// Creates or updates `path`, skipping the write for identical content.
    pub async fn upload(&self, path: &str, content: &str, message: &str) -> RemoteResult<UploadOutcome> {
        let check = self.resolve_version(path, content).await?;
        self.write_resolved(path, content, check, message).await
    }
}
