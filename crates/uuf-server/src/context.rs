//! Server context - shared state for the request handlers
//!
//! Holds the loaded apps, keyed by name.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;
use uuf_core::App;

use crate::discovery::discover_apps;
use crate::error::{Error, Result};

/// Configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Directory whose subdirectories are apps
    pub apps_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9090,
            host: "127.0.0.1".to_string(),
            apps_dir: PathBuf::from("apps"),
        }
    }
}

/// Shared context for the server.
///
/// This is wrapped in `Arc` and shared across all request handlers. Each
/// [`App`] guards its own lookup table cache, so no lock is needed here.
#[derive(Debug)]
pub struct ServerContext {
    apps: IndexMap<String, Arc<App>>,
}

impl ServerContext {
    /// Load every app found under the configured apps directory.
    pub fn load(config: &ServerConfig) -> Result<Self> {
        if !config.apps_dir.is_dir() {
            return Err(Error::AppsDirNotFound(config.apps_dir.clone()));
        }

        let apps: Vec<App> = discover_apps(&config.apps_dir)
            .into_iter()
            .map(|dir| App::open(dir.name, dir.root))
            .collect();
        if apps.is_empty() {
            return Err(Error::NoApps(config.apps_dir.clone()));
        }

        let ctx = Self::from_apps(apps);
        info!(apps = ?ctx.app_names(), "Loaded apps");
        Ok(ctx)
    }

    /// Build a context from already constructed apps.
    pub fn from_apps(apps: impl IntoIterator<Item = App>) -> Self {
        let apps = apps
            .into_iter()
            .map(|app| (app.name().to_string(), Arc::new(app)))
            .collect();
        Self { apps }
    }

    pub fn app(&self, name: &str) -> Option<Arc<App>> {
        self.apps.get(name).cloned()
    }

    pub fn app_names(&self) -> Vec<String> {
        self.apps.keys().cloned().collect()
    }
}

/// Type alias for the shared context.
pub type SharedContext = Arc<ServerContext>;
