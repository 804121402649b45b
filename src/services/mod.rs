//! Upstream service clients.
//!
//! # Design Decisions
//! - Capabilities are resolved once at startup from configuration and
//!   passed by reference to the application; there is no module-level
//!   mutable state
//! - Missing credentials degrade explicitly: the chat service falls back
//!   to a mock, the repository service to `None`

pub mod chat;
pub mod repo;

pub use chat::{ChatError, ChatService};
pub use repo::{RepoError, RepoService};

use crate::config::AppConfig;

/// The application's external collaborators, resolved once.
#[derive(Debug)]
pub struct Services {
    pub chat: ChatService,
    pub repo: Option<RepoService>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Self {
        let chat = match ChatService::from_config(&config.chat) {
            Ok(service) => service,
            Err(error) => {
                tracing::error!(error = %error, "chat client construction failed, using mock");
                ChatService::Mock
            }
        };
        Self {
            chat,
            repo: RepoService::from_config(&config.repo),
        }
    }
}
