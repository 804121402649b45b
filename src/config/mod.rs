//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (secrets, port, debug)
//!     → AppConfig (immutable once resolved)
//!     → shared by reference with services and binaries
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the backend runs with no config file
//! - Secrets (API keys, tokens, password) come from the environment in
//!   deployed settings; the file carries tunables

pub mod loader;
pub mod schema;

pub use loader::{load_config, resolve, ConfigError};
pub use schema::{AppConfig, ChatConfig, PublishConfig, RepoConfig, ServerConfig};
