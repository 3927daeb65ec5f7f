//! Shared application state injected into every handler.

use std::sync::Arc;

use fur_config::config::Config;
use fur_registry::Registry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    /// Prefix under which every route is mounted a second time; `/` disables
    /// the prefixed copy.
    pub api_prefix: String,
    /// Largest accepted request body, in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    pub fn new(registry: Registry, config: &Config) -> Self {
        Self {
            registry: Arc::new(registry),
            api_prefix: config.api_prefix().to_string(),
            max_upload_size: config.max_upload_size(),
        }
    }
}
