/*
 * app.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! A loaded application: cached lookup table plus request handling.
//!
//! The lookup table and compiled routes live in an [`AppSnapshot`]. A new
//! snapshot is built in full and only then swapped in, so a request never
//! observes a partially built table.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::compose::{RenderEnv, RenderPass};
use crate::config::{APP_CONFIG_FILE, AppConfig};
use crate::error::{LoadError, Result};
use crate::identity::{IdentityProvider, SessionStore, is_permitted};
use crate::lookup::LookupTable;
use crate::request::RequestInfo;
use crate::router::{Routes, app_relative};
use crate::script::ScriptRegistry;
use crate::source::{FileSource, FsSource};

/// What a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Html(String),
    NotFound,
    Redirect(String),
    Forbidden,
}

/// Everything derived from one generation of an app's files.
#[derive(Debug)]
pub struct AppSnapshot {
    pub config: AppConfig,
    /// Modification time of `app.json` when this snapshot was built.
    pub modified: SystemTime,
    pub lookup: LookupTable,
    pub routes: Routes,
}

impl AppSnapshot {
    fn build(
        source: &dyn FileSource,
        scripts: &ScriptRegistry,
        modified: SystemTime,
    ) -> std::result::Result<Self, LoadError> {
        let config = AppConfig::load(source)?;
        let lookup = LookupTable::build(source, scripts)?;
        let routes = Routes::compile(&lookup)?;
        Ok(Self {
            config,
            modified,
            lookup,
            routes,
        })
    }
}

pub struct App {
    name: String,
    root: Option<PathBuf>,
    source: Arc<dyn FileSource>,
    scripts: ScriptRegistry,
    identity: Arc<dyn IdentityProvider>,
    snapshot: RwLock<Option<Arc<AppSnapshot>>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("scripts", &self.scripts)
            .finish_non_exhaustive()
    }
}

impl App {
    /// An app backed by an arbitrary file source, with in-memory sessions.
    pub fn new(name: impl Into<String>, source: Arc<dyn FileSource>) -> Self {
        Self {
            name: name.into(),
            root: None,
            source,
            scripts: ScriptRegistry::new(),
            identity: Arc::new(SessionStore::new()),
            snapshot: RwLock::new(None),
        }
    }

    /// An app served from a directory on disk.
    pub fn open(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut app = Self::new(name, Arc::new(FsSource::new(root.clone())));
        app.root = Some(root);
        app
    }

    pub fn with_scripts(mut self, scripts: ScriptRegistry) -> Self {
        self.scripts = scripts;
        self.invalidate();
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Drop the cached snapshot; the next request rebuilds it.
    pub fn invalidate(&self) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The current snapshot, rebuilt when caching is disabled or `app.json`
    /// changed since it was built.
    pub fn snapshot(&self) -> std::result::Result<Arc<AppSnapshot>, LoadError> {
        let config_path = Path::new(APP_CONFIG_FILE);
        let modified = self
            .source
            .last_modified(config_path)
            .map_err(|e| LoadError::Io {
                path: config_path.to_path_buf(),
                source: e,
            })?;

        let current = self
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(current) = current {
            if current.config.caching_enabled && modified <= current.modified {
                return Ok(current);
            }
            debug!(app = %self.name, "Lookup table stale, rebuilding");
        }

        let fresh = Arc::new(AppSnapshot::build(
            self.source.as_ref(),
            &self.scripts,
            modified,
        )?);
        info!(
            app = %self.name,
            pages = fresh.lookup.pages.len(),
            units = fresh.lookup.units.len(),
            routes = fresh.routes.len(),
            "Lookup table published"
        );
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Route and render one request.
    pub fn handle(&self, request: &RequestInfo) -> Result<Outcome> {
        let Some(path) = app_relative(&self.name, &request.path) else {
            return Ok(Outcome::NotFound);
        };
        let snapshot = self.snapshot()?;
        let Some(route) = snapshot.routes.resolve(path) else {
            debug!(app = %self.name, path, "No page matches");
            return Ok(Outcome::NotFound);
        };

        let user = self.identity.current_user(request);
        if let Some(page) = snapshot.lookup.pages.get(&route.page) {
            if !is_permitted(user.as_ref(), &page.definition.permissions) {
                return Ok(match &snapshot.config.login_uri {
                    Some(login) => {
                        debug!(page = %page.full_name, login = %login, "Permission denied, redirecting");
                        Outcome::Redirect(login.clone())
                    }
                    None => {
                        warn!(page = %page.full_name, "Permission denied and no login URI configured");
                        Outcome::Forbidden
                    }
                });
            }
        }

        let env = RenderEnv {
            app_name: &self.name,
            config: &snapshot.config,
            lookup: &snapshot.lookup,
            scripts: &self.scripts,
            source: self.source.as_ref(),
            request,
            uri_params: &route.uri_params,
            user: user.as_ref(),
        };
        let html = RenderPass::new(env).render_page(&route.page, &route.pushed_units)?;
        Ok(Outcome::Html(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{SESSION_COOKIE, User};
    use crate::source::MemorySource;
    use std::time::Duration;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_file("app.json", r#"{ "displayName": "Store" }"#)
            .with_file("layouts/main.hbs", "<main>{{defineZone \"content\"}}</main>")
            .with_file(
                "pages/store.home/home.json",
                r#"{ "version": "1.0.0", "uri": "/", "layout": "main" }"#,
            )
            .with_file("pages/store.home/home.hbs", "{{#zone \"content\"}}home{{/zone}}")
            .with_file(
                "pages/store.admin/admin.json",
                r#"{ "version": "1.0.0", "uri": "/admin", "layout": "main", "permissions": ["admin"] }"#,
            )
            .with_file("pages/store.admin/admin.hbs", "{{#zone \"content\"}}admin{{/zone}}")
    }

    #[test]
    fn test_handle_renders_page() {
        let app = App::new("store", Arc::new(source()));
        let outcome = app.handle(&RequestInfo::get("/store/")).unwrap();
        assert_eq!(outcome, Outcome::Html("<main>home</main>".to_string()));
    }

    #[test]
    fn test_not_found() {
        let app = App::new("store", Arc::new(source()));
        assert_eq!(app.handle(&RequestInfo::get("/store/nope")).unwrap(), Outcome::NotFound);
        assert_eq!(app.handle(&RequestInfo::get("/other/")).unwrap(), Outcome::NotFound);
    }

    #[test]
    fn test_disabled_page_is_not_found() {
        let files = source()
            .with_file(
                "pages/store.sale/sale.json",
                r#"{ "version": "1.0.0", "uri": "/sale", "layout": "main", "disabled": true }"#,
            )
            .with_file("pages/store.sale/sale.hbs", "{{#zone \"content\"}}sale{{/zone}}");
        let app = App::new("store", Arc::new(files));
        assert_eq!(app.handle(&RequestInfo::get("/store/sale")).unwrap(), Outcome::NotFound);
        assert_eq!(
            app.handle(&RequestInfo::get("/store/")).unwrap(),
            Outcome::Html("<main>home</main>".to_string())
        );
    }

    #[test]
    fn test_permission_gate() {
        let app = App::new("store", Arc::new(source()));
        assert_eq!(app.handle(&RequestInfo::get("/store/admin")).unwrap(), Outcome::Forbidden);

        let sessions = Arc::new(SessionStore::new());
        let app = App::new("store", Arc::new(source())).with_identity(sessions.clone());
        let request =
            RequestInfo::get("/store/admin").with_header("cookie", format!("{}=abc", SESSION_COOKIE));
        sessions.set_current_user(&request, Some(User::new("root", "carbon.super", -1234).with_permission("admin")));
        assert_eq!(
            app.handle(&request).unwrap(),
            Outcome::Html("<main>admin</main>".to_string())
        );
    }

    #[test]
    fn test_snapshot_cached_until_config_changes() {
        let files = Arc::new(source());
        let app = App::new("store", files.clone());
        let first = app.snapshot().unwrap();
        assert!(Arc::ptr_eq(&first, &app.snapshot().unwrap()));

        files.insert_at(
            "app.json",
            r#"{ "displayName": "Store 2" }"#,
            first.modified + Duration::from_secs(5),
        );
        let second = app.snapshot().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.config.display_name.as_deref(), Some("Store 2"));
    }

    #[test]
    fn test_caching_disabled_rebuilds() {
        let files = source().with_file("app.json", r#"{ "cachingEnabled": false }"#);
        let app = App::new("store", Arc::new(files));
        let first = app.snapshot().unwrap();
        assert!(!Arc::ptr_eq(&first, &app.snapshot().unwrap()));
    }

    #[test]
    fn test_load_error_publishes_nothing() {
        let files = MemorySource::new().with_file("app.json", "{ not json");
        let app = App::new("store", Arc::new(files));
        assert!(matches!(app.snapshot(), Err(LoadError::Json { .. })));
        assert!(app.snapshot.read().unwrap().is_none());
    }
}
