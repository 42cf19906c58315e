//! Application configuration (`app.json`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::source::FileSource;

/// Path of the configuration file, relative to the app root.
pub const APP_CONFIG_FILE: &str = "app.json";

/// Parsed `app.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub display_name: Option<String>,

    /// When false the lookup table is rebuilt on every request.
    #[serde(default = "default_caching_enabled")]
    pub caching_enabled: bool,

    /// Where pages that fail their permission check redirect to.
    #[serde(default)]
    pub login_uri: Option<String>,

    #[serde(default)]
    pub auth: Option<AuthConfig>,

    /// Base URI for fragment resources. Defaults to `/{app}/public`.
    #[serde(default)]
    pub public_uri: Option<String>,
}

/// Nested auth-module configuration. Only carried, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub name: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

fn default_caching_enabled() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            caching_enabled: true,
            login_uri: None,
            auth: None,
            public_uri: None,
        }
    }
}

impl AppConfig {
    /// Read and parse `app.json` from a source.
    pub fn load(source: &dyn FileSource) -> Result<Self, LoadError> {
        let path = Path::new(APP_CONFIG_FILE);
        let text = source.read_all(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| LoadError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn display_name<'a>(&'a self, app_name: &'a str) -> &'a str {
        self.display_name.as_deref().unwrap_or(app_name)
    }

    /// Resource base URI without a trailing slash.
    pub fn public_uri(&self, app_name: &str) -> String {
        match &self.public_uri {
            Some(uri) => uri.trim_end_matches('/').to_string(),
            None => format!("/{}/public", app_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.caching_enabled);
        assert_eq!(config.display_name("store"), "store");
        assert_eq!(config.public_uri("store"), "/store/public");
    }

    #[test]
    fn test_full_config() {
        let source = MemorySource::new().with_file(
            "app.json",
            r#"{
                "displayName": "Store",
                "cachingEnabled": false,
                "loginUri": "/store/login",
                "publicUri": "/static/",
                "auth": { "name": "basic", "properties": { "realm": "carbon" } }
            }"#,
        );
        let config = AppConfig::load(&source).unwrap();
        assert_eq!(config.display_name("store"), "Store");
        assert!(!config.caching_enabled);
        assert_eq!(config.login_uri.as_deref(), Some("/store/login"));
        assert_eq!(config.public_uri("store"), "/static");
        let auth = config.auth.unwrap();
        assert_eq!(auth.name, "basic");
        assert_eq!(auth.properties["realm"], "carbon");
    }

    #[test]
    fn test_missing_config() {
        let err = AppConfig::load(&MemorySource::new()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
