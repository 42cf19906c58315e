//! Error types for uuf-core

use std::path::PathBuf;

use thiserror::Error;

use crate::component::ComponentKind;

/// Fatal errors raised while loading an app's configuration or building its
/// lookup table. No partial table is ever published when one of these occurs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Component directory '{0}' is not named '{{namespace}}.{{shortName}}'")]
    InvalidComponentName(String),

    #[error("Definition file {path} is missing for {kind} '{component}'")]
    MissingDefinition {
        kind: ComponentKind,
        component: String,
        path: PathBuf,
    },

    #[error("{kind} '{component}' extends unknown {kind} '{parent}'")]
    MissingParent {
        kind: ComponentKind,
        component: String,
        parent: String,
    },

    #[error("Cyclic inheritance: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    #[error("Invalid {kind} '{component}' (chain: {}): {reason}", chain.join(" -> "))]
    Invalid {
        kind: ComponentKind,
        component: String,
        chain: Vec<String>,
        reason: String,
    },

    #[error("Invalid URI pattern '{pattern}': {reason}")]
    UriPattern { pattern: String, reason: String },
}

/// Errors that abort a single render pass. Other requests are unaffected.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown {kind} '{name}'")]
    UnknownComponent { kind: ComponentKind, name: String },

    #[error("Page '{page}' refers to unknown layout '{layout}'")]
    UnknownLayout { page: String, layout: String },

    #[error("Zone '{zone}' cannot be opened inside '{}': only one level of nesting is allowed", open.join(" > "))]
    ZoneNesting { zone: String, open: Vec<String> },

    #[error("Recursive fragment reference: {}", chain.join(" -> "))]
    Recursive { chain: Vec<String> },

    #[error("'{helper}' must be used inside exactly one top-level zone")]
    ResourceOutsideZone { helper: String },

    #[error("'{helper}': {message}")]
    Usage { helper: String, message: String },

    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template {path} does not compile: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: handlebars::TemplateError,
    },

    #[error("Template {path} failed: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("Script for '{component}' failed: {source}")]
    Script {
        component: String,
        #[source]
        source: ScriptError,
    },
}

impl RenderError {
    pub(crate) fn usage(helper: &str, message: impl Into<String>) -> Self {
        RenderError::Usage {
            helper: helper.to_string(),
            message: message.into(),
        }
    }
}

/// Error returned by a script handler.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScriptError {
    message: String,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::App::handle`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type Result<T> = std::result::Result<T, AppError>;
