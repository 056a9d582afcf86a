pub mod api;
pub mod cli;
pub mod config;
pub mod forms;
pub mod listing;
pub mod models;
pub mod routes;
pub mod screens;
pub mod session;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::{HttpLibraryApi, LibraryApi};
use crate::config::Config;
use crate::routes::{guard, Destination, GuardDecision};
use crate::session::{FileStorage, SessionStore};

/// Everything a command needs: configuration, the session and the backend.
pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: Arc<dyn LibraryApi>,
}

impl AppContext {
    pub fn new(config: Config, session: Arc<SessionStore>, api: Arc<dyn LibraryApi>) -> Self {
        Self {
            config,
            session,
            api,
        }
    }

    /// Open the file-backed session and an HTTP client against `config.api`.
    pub fn from_config(config: Config) -> Result<Self> {
        let storage = FileStorage::new(config.storage.path.clone());
        let session = Arc::new(SessionStore::open(storage));
        let api = HttpLibraryApi::new(&config.api, session.clone())
            .context("Failed to create HTTP client")?;
        Ok(Self::new(config, session, Arc::new(api)))
    }

    /// Run the route guard for `destination` against the current session.
    pub fn navigate(&self, destination: Destination) -> GuardDecision {
        guard(&self.session.current(), destination)
    }
}
