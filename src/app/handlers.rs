//! Route handlers.
//!
//! Each handler parses what it needs from the canonical request, calls
//! the services, and returns a [`Reply`] or a [`HandlerError`] that the
//! dispatcher renders as the JSON error shape.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::adapter::CanonicalRequest;
use crate::app::{HandlerError, Reply};
use crate::config::PublishConfig;
use crate::content::front_matter::{self, FrontMatter};
use crate::services::chat::{ChatError, ChatService};
use crate::services::repo::{RepoError, RepoService};

const ALLOWED_IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

impl From<RepoError> for HandlerError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::NotFound(path) => HandlerError::not_found(format!("file not found: {path}")),
            RepoError::Http(_) | RepoError::Status { .. } => {
                HandlerError { status: 502, message: error.to_string() }
            }
            RepoError::Base64(_) | RepoError::Utf8(_) => HandlerError::internal(error.to_string()),
        }
    }
}

impl From<ChatError> for HandlerError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::EmptyContent => HandlerError::bad_request(error.to_string()),
            ChatError::Unavailable => HandlerError::unavailable(error.to_string()),
            ChatError::Http(_) | ChatError::Payload(_) => {
                HandlerError { status: 502, message: error.to_string() }
            }
        }
    }
}

fn json_body<T: DeserializeOwned>(request: &CanonicalRequest) -> Result<T, HandlerError> {
    if request.body.is_empty() {
        return Err(HandlerError::bad_request("missing JSON body"));
    }
    if let Some(content_type) = request.application_header("CONTENT_TYPE") {
        if !content_type.starts_with("application/json") {
            return Err(HandlerError::bad_request(format!(
                "unsupported content type `{content_type}`, expected application/json"
            )));
        }
    }
    serde_json::from_slice(&request.body)
        .map_err(|error| HandlerError::bad_request(format!("invalid JSON body: {error}")))
}

pub fn health() -> Result<Reply, HandlerError> {
    Ok(Reply::json(
        200,
        &json!({
            "success": true,
            "status": "ok",
            "timestamp": front_matter::now_stamp(),
        }),
    ))
}

pub fn get_config(publish: &PublishConfig) -> Result<Reply, HandlerError> {
    Ok(Reply::json(
        200,
        &json!({
            "success": true,
            "config": {
                "default_target_dir": publish.default_target_dir,
                "supported_formats": ["md", "markdown"],
                "max_content_size": publish.max_content_size,
            },
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct FormatRequest {
    content: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category: String,
}

pub fn format_article(chat: &ChatService, request: &CanonicalRequest) -> Result<Reply, HandlerError> {
    let body: FormatRequest = json_body(request)?;
    let content = body
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| HandlerError::bad_request("missing article content"))?;

    let formatted = chat.format_article(&content, &body.title, &body.tags, &body.category)?;
    Ok(Reply::json(
        200,
        &json!({ "success": true, "formatted_content": formatted }),
    ))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category: Option<String>,
}

pub fn preview_article(request: &CanonicalRequest) -> Result<Reply, HandlerError> {
    let body: PreviewRequest = json_body(request)?;
    let title = body
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| HandlerError::bad_request("missing article title"))?;

    let front_matter = FrontMatter {
        title,
        date: body.date,
        tags: body.tags,
        category: body.category,
        draft: false,
    };
    Ok(Reply::json(
        200,
        &json!({ "success": true, "front_matter": front_matter.generate() }),
    ))
}

#[derive(Debug, Deserialize)]
struct PublishRequest {
    #[serde(default)]
    title: String,
    content: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    target_dir: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default = "default_true")]
    auto_format: bool,
}

fn default_true() -> bool {
    true
}

pub fn publish_article(
    chat: &ChatService,
    repo: &RepoService,
    publish: &PublishConfig,
    request: &CanonicalRequest,
) -> Result<Reply, HandlerError> {
    let body: PublishRequest = json_body(request)?;
    let mut content = body
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| HandlerError::bad_request("missing article content"))?;
    let mut title = body.title.trim().to_string();
    let category = body.category.unwrap_or_default();

    if body.auto_format {
        match chat.format_article(&content, &title, &body.tags, &category) {
            Ok(formatted) => content = formatted,
            Err(error) => {
                // Formatting is best-effort; the article still publishes.
                tracing::warn!(error = %error, "auto format failed, publishing original content");
            }
        }
    }

    if title.is_empty() {
        title = match chat.improve_title(&content) {
            Ok(generated) => generated,
            Err(error) => {
                tracing::warn!(error = %error, "title generation failed, using fallback");
                format!(
                    "untitled-{}",
                    chrono::Utc::now().format("%Y%m%d%H%M%S")
                )
            }
        };
    }

    let filename = front_matter::generate_filename(&title, body.date.as_deref());
    let document = FrontMatter {
        title: title.clone(),
        date: body.date,
        tags: body.tags,
        category: if category.is_empty() { None } else { Some(category) },
        draft: body.draft,
    }
    .wrap(&content);

    let target_dir = body
        .target_dir
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| publish.default_target_dir.clone());

    let uploaded = repo.upload_file(
        document.as_bytes(),
        &filename,
        &target_dir,
        &format!("Publish: {title}"),
    )?;

    Ok(Reply::json(
        200,
        &json!({
            "success": true,
            "message": "article published",
            "file_path": uploaded.file_path,
            "url": uploaded.url,
        }),
    ))
}

pub fn list_files(
    repo: &RepoService,
    publish: &PublishConfig,
    request: &CanonicalRequest,
) -> Result<Reply, HandlerError> {
    let path = request
        .query_param("path")
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| publish.default_target_dir.clone());
    let fetch_metadata = matches!(
        request.query_param("metadata").as_deref(),
        Some("true") | Some("1")
    );

    let files: Vec<_> = repo
        .list_files(&path, fetch_metadata)?
        .into_iter()
        .filter(|file| file.is_markdown())
        .collect();

    Ok(Reply::json(
        200,
        &json!({ "success": true, "path": path, "files": files }),
    ))
}

fn required_path(request: &CanonicalRequest) -> Result<String, HandlerError> {
    request
        .query_param("path")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| HandlerError::bad_request("missing file path"))
}

pub fn get_file(repo: &RepoService, request: &CanonicalRequest) -> Result<Reply, HandlerError> {
    let path = required_path(request)?;
    let file = repo.get_file_content(&path)?;
    Ok(Reply::json(
        200,
        &json!({
            "success": true,
            "content": file.content,
            "path": file.path,
            "sha": file.sha,
        }),
    ))
}

pub fn delete_file(repo: &RepoService, request: &CanonicalRequest) -> Result<Reply, HandlerError> {
    let path = required_path(request)?;
    repo.delete_file(&path, &format!("Delete: {path}"))?;
    Ok(Reply::json(200, &json!({ "success": true, "path": path })))
}

#[derive(Debug, Deserialize)]
struct VerifyPasswordRequest {
    #[serde(default)]
    password: String,
}

pub fn verify_password(
    publish: &PublishConfig,
    request: &CanonicalRequest,
) -> Result<Reply, HandlerError> {
    let body: VerifyPasswordRequest = json_body(request)?;
    if body.password == publish.password {
        Ok(Reply::json(
            200,
            &json!({ "success": true, "message": "password verified" }),
        ))
    } else {
        Err(HandlerError::unauthorized("invalid password"))
    }
}

#[derive(Debug, Deserialize)]
struct UploadImageRequest {
    filename: Option<String>,
    content_base64: Option<String>,
    #[serde(default)]
    custom_name: String,
}

pub fn upload_image(
    repo: &RepoService,
    publish: &PublishConfig,
    request: &CanonicalRequest,
) -> Result<Reply, HandlerError> {
    use base64::Engine as _;

    let body: UploadImageRequest = json_body(request)?;
    let filename = body
        .filename
        .map(|f| f.to_lowercase())
        .filter(|f| !f.is_empty())
        .ok_or_else(|| HandlerError::bad_request("no file supplied"))?;
    let encoded = body
        .content_base64
        .filter(|c| !c.is_empty())
        .ok_or_else(|| HandlerError::bad_request("no file content supplied"))?;

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension) {
        return Err(HandlerError::bad_request("unsupported image format"));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim().as_bytes())
        .map_err(|error| HandlerError::bad_request(format!("invalid base64 content: {error}")))?;

    let name = if body.custom_name.trim().is_empty() {
        format!("{}-{filename}", chrono::Utc::now().timestamp())
    } else {
        let mut name = body.custom_name.trim().to_string();
        if !name.to_lowercase().ends_with(&format!(".{extension}")) {
            name = format!("{name}.{extension}");
        }
        name
    };
    let name = sanitize_image_name(&name);

    repo.upload_file(
        &bytes,
        &name,
        &publish.image_dir,
        &format!("Upload image: {name}"),
    )?;

    Ok(Reply::json(
        200,
        &json!({
            "success": true,
            "message": "image uploaded",
            "url": format!("/images/{name}"),
            "filename": name,
        }),
    ))
}

/// Keep image names URL-safe: separators become dashes, anything that is
/// not alphanumeric, a dot, or a dash is dropped.
fn sanitize_image_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-')
        .collect()
}
