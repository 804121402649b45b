//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Resolve the effective configuration: the file named by `CONFIG_PATH`
/// (or `publisher.toml` if present), then environment overrides on top.
pub fn resolve() -> Result<AppConfig, ConfigError> {
    let mut config = match env::var("CONFIG_PATH") {
        Ok(path) => load_config(Path::new(&path))?,
        Err(_) => {
            let default_path = Path::new("publisher.toml");
            if default_path.exists() {
                load_config(default_path)?
            } else {
                AppConfig::default()
            }
        }
    };
    apply_env(&mut config);
    Ok(config)
}

/// Overlay environment variables onto a loaded configuration. Secrets
/// always come from the environment in deployed settings.
pub fn apply_env(config: &mut AppConfig) {
    if let Ok(key) = env::var("DEEPSEEK_API_KEY") {
        config.chat.api_key = key;
    }
    if let Ok(model) = env::var("DEEPSEEK_MODEL") {
        config.chat.model = model;
    }
    if let Ok(token) = env::var("GITHUB_TOKEN") {
        config.repo.token = token;
    }
    if let Ok(owner) = env::var("GITHUB_USERNAME") {
        config.repo.owner = owner;
    }
    if let Ok(repo) = env::var("GITHUB_REPO") {
        config.repo.repo = repo;
    }
    if let Ok(branch) = env::var("GITHUB_BRANCH") {
        config.repo.branch = branch;
    }
    if let Ok(password) = env::var("PUBLISH_PASSWORD") {
        config.publish.password = password;
    }
    if let Ok(port) = env::var("PORT") {
        if port.parse::<u16>().is_ok() {
            config.server.bind_address = format!("0.0.0.0:{port}");
        }
    }
    if let Ok(debug) = env::var("DEBUG") {
        config.server.debug = debug.eq_ignore_ascii_case("true") || debug == "1";
    }
}
