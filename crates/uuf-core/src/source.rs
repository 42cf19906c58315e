/*
 * source.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Read-only access to an app's files.
 */

//! File sources.
//!
//! Everything the engine reads (`app.json`, definitions, templates, layouts)
//! goes through a [`FileSource`]. Paths are relative to the app root and always
//! use `/` separators.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use walkdir::WalkDir;

/// Synchronous, read-only view of an app directory.
pub trait FileSource: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_all(&self, path: &Path) -> io::Result<String>;

    fn last_modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Names of the immediate entries of a directory, sorted.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// A [`FileSource`] rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSource for FsSource {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn read_all(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }

    fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(self.resolve(path))?.modified()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let dir = self.resolve(path);
        let mut names = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::other)?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    contents: String,
    modified: SystemTime,
}

/// In-memory [`FileSource`] for tests and embedding.
///
/// Directories exist implicitly as prefixes of file paths. Files can be
/// replaced at any time, which makes it possible to exercise cache
/// invalidation.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<BTreeMap<PathBuf, MemoryFile>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, stamped with the current time.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.insert_at(path, contents, SystemTime::now());
    }

    /// Add or replace a file with an explicit modification time.
    pub fn insert_at(&self, path: impl Into<PathBuf>, contents: impl Into<String>, modified: SystemTime) {
        let file = MemoryFile {
            contents: contents.into(),
            modified,
        };
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), file);
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
    }
}

impl FileSource for MemorySource {
    fn exists(&self, path: &Path) -> bool {
        self.is_dir(path)
            || self
                .files
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }

    fn read_all(&self, path: &Path) -> io::Result<String> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files
            .get(path)
            .map(|f| f.contents.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn last_modified(&self, path: &Path) -> io::Result<SystemTime> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files
            .get(path)
            .map(|f| f.modified)
            .ok_or_else(|| Self::not_found(path))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        if !self.is_dir(path) {
            return Err(Self::not_found(path));
        }
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = files
            .keys()
            .filter_map(|file| file.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| first.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
