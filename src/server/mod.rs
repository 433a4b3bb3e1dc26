//! TCP listener and the state shared by every connection

pub mod listener;

use crate::config::Config;
use crate::router::Router;
use crate::storage::FileStore;

/// Read-only state shared by all connection tasks.
#[derive(Debug, Clone)]
pub struct ServerState {
    config: Config,
    router: Router,
    store: Option<FileStore>,
}

impl ServerState {
    /// Builds the state with the default routes.
    pub fn new(config: Config) -> Self {
        Self::with_router(config, Router::with_default_routes())
    }

    pub fn with_router(config: Config, router: Router) -> Self {
        let store = config.files_directory.clone().map(FileStore::new);
        Self {
            config,
            router,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The file store, if a files directory was configured.
    pub fn store(&self) -> Option<&FileStore> {
        self.store.as_ref()
    }
}
