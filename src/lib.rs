//! Blog publisher backend library.

pub mod adapter;
pub mod app;
pub mod config;
pub mod content;
pub mod services;

pub use adapter::{Application, Gateway, RequestWire, WireResponse};
pub use app::PublisherApp;
pub use config::AppConfig;
pub use services::Services;
