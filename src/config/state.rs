// Application state module
// Read-only state shared by every request handler

use super::types::Config;
use crate::error::WikiError;
use crate::storage::PageStore;
use crate::template::Templates;

/// Application state, built once at startup and shared through `Arc`
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
    pub templates: Templates,
}

impl AppState {
    /// Open the page store and compile the template set described by `config`
    pub fn new(config: Config) -> Result<Self, WikiError> {
        let store = PageStore::open(&config.storage)?;
        let templates = if config.templates.dir.is_empty() {
            Templates::builtin()?
        } else {
            Templates::load_dir(&config.templates.dir)?
        };

        Ok(Self::with_parts(config, store, templates))
    }

    /// Assemble state from already constructed parts
    pub fn with_parts(config: Config, store: PageStore, templates: Templates) -> Self {
        Self {
            config,
            store,
            templates,
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
