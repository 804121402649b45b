//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files;
//! every field has a default so a minimal config is valid. Secrets are
//! expected to arrive through environment overrides, not the file.

use serde::{Deserialize, Serialize};

/// Root configuration for the publisher backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Development server settings.
    pub server: ServerConfig,

    /// Chat-completion API settings.
    pub chat: ChatConfig,

    /// Git repository (publishing target) settings.
    pub repo: RepoConfig,

    /// Publishing defaults and limits.
    pub publish: PublishConfig,
}

/// Development server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Append failure detail to adapter error replies.
    pub debug: bool,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            debug: false,
            request_timeout_secs: 120,
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Chat-completion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// API key; when empty the mock service is substituted.
    pub api_key: String,

    /// API base URL.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Git repository configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Access token; publishing is disabled without it.
    pub token: String,

    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Branch commits land on.
    pub branch: String,

    /// Timeout for read calls in seconds.
    pub read_timeout_secs: u64,

    /// Timeout for write calls in seconds.
    pub write_timeout_secs: u64,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            read_timeout_secs: 10,
            write_timeout_secs: 30,
        }
    }
}

/// Publishing defaults and limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Password gating the publish UI.
    pub password: String,

    /// Default directory articles land in.
    pub default_target_dir: String,

    /// Directory uploaded images land in.
    pub image_dir: String,

    /// Maximum article content size in bytes.
    pub max_content_size: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            password: "chen".to_string(),
            default_target_dir: "content/posts".to_string(),
            image_dir: "static/images".to_string(),
            max_content_size: 50 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_minimal_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:5000");
        assert_eq!(config.chat.model, "deepseek-chat");
        assert_eq!(config.repo.branch, "main");
        assert_eq!(config.publish.default_target_dir, "content/posts");
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [chat]
            model = "deepseek-coder"
            "#,
        )
        .unwrap();
        assert_eq!(config.chat.model, "deepseek-coder");
        assert_eq!(config.chat.base_url, "https://api.deepseek.com");
    }
}
