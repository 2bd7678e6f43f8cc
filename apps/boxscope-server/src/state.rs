//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::engine::SharedEngine;
use crate::session::SessionManager;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engine: SharedEngine,
    sessions: SessionManager,
}

impl AppState {
    pub fn new(config: Config, engine: SharedEngine) -> Self {
        let sessions = SessionManager::new(
            config.render,
            Duration::from_secs(config.sessions.ttl_secs),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                sessions,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the PDF engine
    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.inner.engine)
    }

    /// Get the session manager
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }
}
