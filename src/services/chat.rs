//! Chat-completion API client (article formatting and titling).
//!
//! # Responsibilities
//! - Call an OpenAI-compatible chat-completions endpoint
//! - Build the formatting and titling prompts
//! - Substitute a mock when no API key is configured
//!
//! # Design Decisions
//! - One POST per operation with a fixed timeout; failed calls are never
//!   retried here (callers decide whether a failure is fatal)
//! - The mock keeps the publish flow usable offline: formatting returns
//!   the content with an advisory note, titling reports unavailability

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChatConfig;

const MAX_TOKENS: u32 = 4096;

/// Errors from the chat-completion service.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat API returned a malformed payload: {0}")]
    Payload(String),

    #[error("article content is empty")]
    EmptyContent,

    #[error("chat API key not configured")]
    Unavailable,
}

/// Chat capability resolved once at startup: the real client when an API
/// key is configured, the mock otherwise.
#[derive(Debug)]
pub enum ChatService {
    Api(ChatClient),
    Mock,
}

impl ChatService {
    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        if config.api_key.is_empty() {
            tracing::warn!("chat API key not set, using mock service");
            return Ok(ChatService::Mock);
        }
        Ok(ChatService::Api(ChatClient::new(config)?))
    }

    /// Rework an article into clean Hugo-compatible markdown.
    pub fn format_article(
        &self,
        content: &str,
        title: &str,
        tags: &[String],
        category: &str,
    ) -> Result<String, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyContent);
        }
        match self {
            ChatService::Api(client) => client.format_article(content, title, tags, category),
            ChatService::Mock => Ok(format!(
                "{content}\n\n<!-- formatting skipped: chat API key not configured -->"
            )),
        }
    }

    /// Distill a concise title from article content.
    pub fn improve_title(&self, content: &str) -> Result<String, ChatError> {
        match self {
            ChatService::Api(client) => client.improve_title(content),
            ChatService::Mock => Err(ChatError::Unavailable),
        }
    }
}

/// HTTP client for the chat-completions endpoint.
#[derive(Debug)]
pub struct ChatClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, ChatError> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?
            .error_for_status()?;

        let payload: CompletionResponse = response.json()?;
        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Payload("no choices in completion".to_string()))
    }

    fn format_article(
        &self,
        content: &str,
        title: &str,
        tags: &[String],
        category: &str,
    ) -> Result<String, ChatError> {
        let messages = [
            ChatMessage {
                role: "system",
                content: "You are a professional blog editor who excels at reworking \
                          articles into the markdown conventions of static site \
                          generators, Hugo in particular. Your output is well \
                          structured, cleanly formatted markdown."
                    .to_string(),
            },
            ChatMessage {
                role: "user",
                content: build_format_prompt(content, title, tags, category),
            },
        ];
        Ok(self.complete(&messages, 0.5)?.trim().to_string())
    }

    fn improve_title(&self, content: &str) -> Result<String, ChatError> {
        let messages = [
            ChatMessage {
                role: "system",
                content: "You are a professional blog editor who distills accurate, \
                          concise article titles."
                    .to_string(),
            },
            ChatMessage {
                role: "user",
                content: format!(
                    "Derive a concise, accurate title for the following article.\n\n\
                     Article content:\n{content}\n\n\
                     Requirements:\n\
                     1. At most 30 characters\n\
                     2. Captures the article's subject\n\
                     3. Plain and easy to understand\n\n\
                     Return only the title, with no explanation."
                ),
            },
        ];
        Ok(self.complete(&messages, 0.3)?.trim().to_string())
    }
}

fn build_format_prompt(content: &str, title: &str, tags: &[String], category: &str) -> String {
    let title = if title.is_empty() { "undecided" } else { title };
    let category = if category.is_empty() { "uncategorized" } else { category };
    let tags = if tags.is_empty() {
        "none".to_string()
    } else {
        tags.join(", ")
    };

    format!(
        "Rework the following article for publication on a Hugo blog.\n\n\
         ## Article information\n\
         - Title: {title}\n\
         - Category: {category}\n\
         - Tags: {tags}\n\n\
         ## Original content\n\
         {content}\n\n\
         ## Requirements\n\
         1. Fix typos and awkward phrasing while keeping the original meaning.\n\
         2. Improve paragraph structure; add H2/H3 subheadings where they help.\n\
         3. Use correct markdown syntax; annotate code blocks with a language.\n\
         4. Reference images with standard markdown (`![alt](/images/name)`); keep \
            existing image links unchanged and never embed base64 images.\n\
         5. Stay compatible with Hugo's markdown renderer; avoid non-standard syntax.\n\
         6. Do NOT emit YAML front matter and do NOT repeat the title as an H1; \
            metadata is handled separately.\n\n\
         Return only the reworked markdown body, with no surrounding explanation or \
         code fences."
    )
}
