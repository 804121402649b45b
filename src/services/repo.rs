//! Git platform contents-API client (article publishing target).
//!
//! # Responsibilities
//! - Upload, fetch, delete, and list files through the platform's
//!   contents API
//! - Look up the existing blob SHA before a write so updates don't clobber
//! - Bulk front-matter date retrieval for listings, fanned out to a
//!   fixed-size worker pool
//!
//! # Design Decisions
//! - Fixed per-call timeouts (short reads, longer writes); no retries
//! - The service is an explicit capability: absent credentials resolve to
//!   `None` at startup and routes report the misconfiguration

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::config::RepoConfig;
use crate::content::front_matter;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("blog-publisher/", env!("CARGO_PKG_VERSION"));

/// Workers used for bulk front-matter retrieval.
const METADATA_POOL_SIZE: usize = 10;

/// Errors from the repository service.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("repository API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("repository API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("file payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("file payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One entry of a directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct RepoFile {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    pub url: String,
    /// Front-matter `date`, filled by the metadata pass when requested.
    pub updated_at: Option<String>,
}

impl RepoFile {
    pub fn is_markdown(&self) -> bool {
        self.kind == "file" && (self.name.ends_with(".md") || self.name.ends_with(".markdown"))
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_path: String,
    pub url: String,
    pub sha: String,
}

/// Decoded file content with its blob SHA.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    path: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WriteReply {
    #[serde(default)]
    content: Option<ContentsEntry>,
}

/// Client for the hosted Git platform's contents API.
#[derive(Debug)]
pub struct RepoService {
    http: reqwest::blocking::Client,
    token: String,
    owner: String,
    repo: String,
    branch: String,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl RepoService {
    /// Resolve the capability from configuration. Any missing credential
    /// disables the service.
    pub fn from_config(config: &RepoConfig) -> Option<Self> {
        for (field, value) in [
            ("token", &config.token),
            ("owner", &config.owner),
            ("repo", &config.repo),
        ] {
            if value.is_empty() {
                tracing::warn!(missing = field, "repository credentials not set, publishing disabled");
                return None;
            }
        }

        let http = match reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(client) => client,
            Err(error) => {
                tracing::error!(error = %error, "failed to build repository HTTP client");
                return None;
            }
        };

        Some(Self {
            http,
            token: config.token.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            write_timeout: Duration::from_secs(config.write_timeout_secs),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{API_BASE}/repos/{}/{}/contents/{}",
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .timeout(self.read_timeout)
    }

    /// Blob SHA of an existing file, `None` when it does not exist.
    fn file_sha(&self, path: &str) -> Result<Option<String>, RepoError> {
        let response = self.get(&self.contents_url(path)).send()?;
        match response.status().as_u16() {
            200 => {
                let entry: ContentsEntry = response.json()?;
                Ok(entry.sha)
            }
            404 => Ok(None),
            status => Err(RepoError::Status {
                status,
                body: response.text().unwrap_or_default(),
            }),
        }
    }

    /// Create or update a file. The existing blob SHA is looked up first
    /// so an update replaces rather than conflicts.
    pub fn upload_file(
        &self,
        bytes: &[u8],
        filename: &str,
        target_dir: &str,
        message: &str,
    ) -> Result<UploadedFile, RepoError> {
        let path = format!("{}/{}", target_dir.trim_matches('/'), filename);
        let sha = self.file_sha(&path)?;

        let mut payload = json!({
            "message": message,
            "content": base64::engine::general_purpose::STANDARD.encode(bytes),
            "branch": self.branch,
        });
        if let Some(sha) = sha {
            payload["sha"] = json!(sha);
        }

        let response = self
            .http
            .put(self.contents_url(&path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .timeout(self.write_timeout)
            .json(&payload)
            .send()?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(RepoError::Status {
                status,
                body: response.text().unwrap_or_default(),
            });
        }

        let reply: WriteReply = response.json()?;
        let entry = reply.content.unwrap_or(ContentsEntry {
            name: String::new(),
            path: String::new(),
            kind: String::new(),
            size: 0,
            html_url: None,
            sha: None,
            content: None,
        });

        tracing::info!(path = %path, "file uploaded");
        Ok(UploadedFile {
            file_path: path,
            url: entry.html_url.unwrap_or_default(),
            sha: entry.sha.unwrap_or_default(),
        })
    }

    /// Delete a file. An absent file is reported, not treated as success.
    pub fn delete_file(&self, path: &str, message: &str) -> Result<(), RepoError> {
        let sha = self
            .file_sha(path)?
            .ok_or_else(|| RepoError::NotFound(path.to_string()))?;

        let payload = json!({
            "message": message,
            "sha": sha,
            "branch": self.branch,
        });

        let response = self
            .http
            .delete(self.contents_url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .timeout(self.write_timeout)
            .json(&payload)
            .send()?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(RepoError::Status {
                status,
                body: response.text().unwrap_or_default(),
            });
        }

        tracing::info!(path = %path, "file deleted");
        Ok(())
    }

    /// Fetch one file's decoded content.
    pub fn get_file_content(&self, path: &str) -> Result<FileContent, RepoError> {
        let response = self.get(&self.contents_url(path)).send()?;
        match response.status().as_u16() {
            200 => {
                let entry: ContentsEntry = response.json()?;
                // The platform wraps base64 payloads across lines.
                let packed: String = entry
                    .content
                    .unwrap_or_default()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let bytes = base64::engine::general_purpose::STANDARD.decode(packed.as_bytes())?;
                Ok(FileContent {
                    path: path.to_string(),
                    content: String::from_utf8(bytes)?,
                    sha: entry.sha.unwrap_or_default(),
                })
            }
            404 => Err(RepoError::NotFound(path.to_string())),
            status => Err(RepoError::Status {
                status,
                body: response.text().unwrap_or_default(),
            }),
        }
    }

    /// List a directory. With `fetch_metadata`, each markdown file's
    /// front-matter `date` is fetched through the worker pool.
    pub fn list_files(&self, path: &str, fetch_metadata: bool) -> Result<Vec<RepoFile>, RepoError> {
        let response = self.get(&self.contents_url(path)).send()?;
        let status = response.status().as_u16();
        if status == 404 {
            return Err(RepoError::NotFound(path.to_string()));
        }
        if !(200..300).contains(&status) {
            return Err(RepoError::Status {
                status,
                body: response.text().unwrap_or_default(),
            });
        }

        let entries: Vec<ContentsEntry> = response.json()?;
        let mut files: Vec<RepoFile> = entries
            .into_iter()
            .map(|entry| RepoFile {
                name: entry.name,
                path: entry.path,
                kind: entry.kind,
                size: entry.size,
                url: entry.html_url.unwrap_or_default(),
                updated_at: None,
            })
            .collect();

        if fetch_metadata {
            self.fetch_dates(&mut files);
        }

        Ok(files)
    }

    /// Fan independent reads out to a bounded pool and join all results;
    /// each result lands back on the entry it was fetched for.
    fn fetch_dates(&self, files: &mut [RepoFile]) {
        let jobs: Vec<(usize, String)> = files
            .iter()
            .enumerate()
            .filter(|(_, file)| file.is_markdown())
            .map(|(idx, file)| (idx, file.path.clone()))
            .collect();
        if jobs.is_empty() {
            return;
        }

        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            for _ in 0..METADATA_POOL_SIZE.min(jobs.len()) {
                let tx = tx.clone();
                let next = &next;
                let jobs = &jobs;
                scope.spawn(move || loop {
                    let slot = next.fetch_add(1, Ordering::Relaxed);
                    let Some((idx, path)) = jobs.get(slot) else {
                        break;
                    };
                    let date = self.front_matter_date(path);
                    if tx.send((*idx, date)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);
            for (idx, date) in rx {
                files[idx].updated_at = date;
            }
        });
    }

    fn front_matter_date(&self, path: &str) -> Option<String> {
        match self.get_file_content(path) {
            Ok(file) => front_matter::parse(&file.content)
                .scalar("date")
                .map(str::to_string),
            Err(error) => {
                tracing::debug!(path = %path, error = %error, "metadata fetch failed");
                None
            }
        }
    }
}
