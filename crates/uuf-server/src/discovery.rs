//! App discovery
//!
//! Every immediate subdirectory of the apps root that holds an `app.json` is an
//! app, named after the directory.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuf_core::config::APP_CONFIG_FILE;
use walkdir::WalkDir;

/// An app directory found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDir {
    pub name: String,
    pub root: PathBuf,
}

/// Find app directories under `apps_root`, sorted by name.
pub fn discover_apps(apps_root: &Path) -> Vec<AppDir> {
    let walker = WalkDir::new(apps_root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    let mut apps: Vec<AppDir> = walker
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| e.path().join(APP_CONFIG_FILE).is_file())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            debug!(app = %name, root = %e.path().display(), "Discovered app");
            Some(AppDir {
                name,
                root: e.path().to_path_buf(),
            })
        })
        .collect();

    apps.sort_by(|a, b| a.name.cmp(&b.name));
    apps
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    // Never filter the root itself
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
