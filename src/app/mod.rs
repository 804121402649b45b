//! The inner application: route dispatch over the canonical request.
//!
//! # Data Flow
//! ```text
//! CanonicalRequest
//!     → route on (method, path)
//!     → handlers.rs (parse body/query, call services)
//!     → Reply or HandlerError
//!     → start/write on the response collector
//! ```
//!
//! # Design Decisions
//! - Handler failures (bad input, unconfigured service, upstream errors)
//!   are caught here and rendered as the JSON error shape; only genuinely
//!   unexpected faults escape to the adapter boundary
//! - `OPTIONS` answers 204 for any path; the encoder attaches the
//!   permissive cross-origin headers

pub mod handlers;

use serde_json::{json, Value};

use crate::adapter::{Application, CanonicalRequest, Method, ResponseCollector};
use crate::config::AppConfig;
use crate::services::{RepoService, Services};

/// A handled route outcome.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8"),
            body: body.into().into_bytes(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// A failure the application reports to the caller instead of faulting.
#[derive(Debug, Clone)]
pub struct HandlerError {
    pub status: u16,
    pub message: String,
}

impl HandlerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: 400, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: 401, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: 404, message: message.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self { status: 503, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: 500, message: message.into() }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

/// The blog-publisher application.
pub struct PublisherApp {
    config: AppConfig,
    services: Services,
}

impl PublisherApp {
    pub fn new(config: AppConfig, services: Services) -> Self {
        Self { config, services }
    }

    /// The repository capability; a handled 503 when credentials were
    /// never configured.
    fn repo(&self) -> Result<&RepoService, HandlerError> {
        self.services
            .repo
            .as_ref()
            .ok_or_else(|| HandlerError::unavailable("repository credentials not configured"))
    }

    fn route(&self, request: &CanonicalRequest) -> Result<Reply, HandlerError> {
        if request.method == Method::Options {
            return Ok(Reply::empty(204));
        }

        match (request.method, request.path.as_str()) {
            (Method::Get, "/") => Ok(Reply::text(200, "blog-publisher API; see /api/health")),
            (Method::Get, "/api/health") => handlers::health(),
            (Method::Get, "/api/config") => handlers::get_config(&self.config.publish),
            (Method::Post, "/api/format") => handlers::format_article(&self.services.chat, request),
            (Method::Post, "/api/preview") => handlers::preview_article(request),
            (Method::Post, "/api/publish") => {
                handlers::publish_article(&self.services.chat, self.repo()?, &self.config.publish, request)
            }
            (Method::Get, "/api/files") => {
                handlers::list_files(self.repo()?, &self.config.publish, request)
            }
            (Method::Get, "/api/file") => handlers::get_file(self.repo()?, request),
            (Method::Delete, "/api/file") => handlers::delete_file(self.repo()?, request),
            (Method::Post, "/api/verify-password") => {
                handlers::verify_password(&self.config.publish, request)
            }
            (Method::Post, "/api/upload-image") => {
                handlers::upload_image(self.repo()?, &self.config.publish, request)
            }
            _ => Err(HandlerError::not_found("no such route")),
        }
    }
}

impl Application for PublisherApp {
    fn call(
        &self,
        request: &CanonicalRequest,
        response: &mut ResponseCollector,
    ) -> anyhow::Result<()> {
        let reply = match self.route(request) {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    status = error.status,
                    error = %error.message,
                    "request rejected"
                );
                Reply::json(
                    error.status,
                    &json!({ "success": false, "error": error.message }),
                )
            }
        };

        let mut headers = Vec::new();
        if let Some(content_type) = reply.content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        response.start(status_line(reply.status), headers);
        if !reply.body.is_empty() {
            response.write(&reply.body);
        }
        Ok(())
    }
}

/// Status line text for the collector's start phase.
fn status_line(status: u16) -> String {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    };
    if reason.is_empty() {
        status.to_string()
    } else {
        format!("{status} {reason}")
    }
}
