/*
 * script.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Fragment script handlers and the ancestor chain they run in.
 */

//! Script handlers.
//!
//! A component may ship a `{shortName}.js` marker; its behaviour is supplied by
//! a Rust handler registered under the component's full name. When a leaf
//! renders, its own handler and its ancestors' handlers form a chain, nearest
//! first. The first handler runs and may call [`SuperChain::on_request`] to
//! delegate to the next one, the way a child script calls its parent's logic.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::component::UiComponent;
use crate::error::ScriptError;
use crate::identity::User;
use crate::request::RequestInfo;

/// Signature of a script handler.
pub type ScriptHandler =
    dyn Fn(&ScriptEnv<'_>, &SuperChain<'_>) -> Result<Value, ScriptError> + Send + Sync;

/// What a handler can see about the request it runs for.
#[derive(Debug, Clone, Copy)]
pub struct ScriptEnv<'a> {
    pub app_name: &'a str,
    pub request: &'a RequestInfo,
    pub uri_params: &'a IndexMap<String, String>,
    /// Hash parameters of the `{{unit}}` call, or null for pages.
    pub unit_params: &'a Value,
    /// The leaf component being rendered.
    pub component: &'a UiComponent,
    pub user: Option<&'a User>,
}

/// The handlers of the remaining (further) ancestors.
pub struct SuperChain<'a> {
    rest: &'a [Arc<ScriptHandler>],
}

impl SuperChain<'_> {
    /// Run the next ancestor's handler. Returns null when there is none.
    pub fn on_request(&self, env: &ScriptEnv<'_>) -> Result<Value, ScriptError> {
        match self.rest.split_first() {
            Some((handler, rest)) => handler(env, &SuperChain { rest }),
            None => Ok(Value::Null),
        }
    }

    pub fn has_super(&self) -> bool {
        !self.rest.is_empty()
    }
}

/// Handlers by component full name.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    handlers: HashMap<String, Arc<ScriptHandler>>,
}

impl std::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("ScriptRegistry").field("handlers", &names).finish()
    }
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, full_name: impl Into<String>, handler: F)
    where
        F: Fn(&ScriptEnv<'_>, &SuperChain<'_>) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        self.handlers.insert(full_name.into(), Arc::new(handler));
    }

    /// Builder-style [`ScriptRegistry::register`].
    pub fn with<F>(mut self, full_name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ScriptEnv<'_>, &SuperChain<'_>) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        self.register(full_name, handler);
        self
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.handlers.contains_key(full_name)
    }

    /// Run the handler chain for `env.component`, or return null when no
    /// component in its chain has a handler.
    pub fn run(&self, env: &ScriptEnv<'_>) -> Result<Value, ScriptError> {
        let chain: Vec<Arc<ScriptHandler>> = env
            .component
            .chain()
            .filter_map(|name| self.handlers.get(name).cloned())
            .collect();
        SuperChain { rest: &chain }.on_request(env)
    }
}
