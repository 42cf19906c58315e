/*
 * identity.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Authenticated users and the session store that tracks them.
 */

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::request::RequestInfo;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "UUFSESSIONID";

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub domain: String,
    pub tenant_id: i64,
    pub permissions: BTreeSet<String>,
}

impl User {
    pub fn new(username: impl Into<String>, domain: impl Into<String>, tenant_id: i64) -> Self {
        Self {
            username: username.into(),
            domain: domain.into(),
            tenant_id,
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// True when the user holds every one of `required`.
    pub fn has_permissions(&self, required: &[String]) -> bool {
        required.iter().all(|p| self.permissions.contains(p))
    }

    /// The user as template data (`user`).
    pub fn to_json(&self) -> Value {
        json!({
            "username": self.username,
            "domain": self.domain,
            "tenantId": self.tenant_id,
            "permissions": self.permissions,
        })
    }
}

/// Whether an optional user passes a permission gate. An empty list always passes.
pub fn is_permitted(user: Option<&User>, required: &[String]) -> bool {
    required.is_empty() || user.is_some_and(|u| u.has_permissions(required))
}

/// Source of the current user for a request.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self, request: &RequestInfo) -> Option<User>;

    fn set_current_user(&self, request: &RequestInfo, user: Option<User>);
}

/// In-memory sessions keyed by the `UUFSESSIONID` cookie.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, User>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityProvider for SessionStore {
    fn current_user(&self, request: &RequestInfo) -> Option<User> {
        let session = request.session_id()?;
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
    }

    fn set_current_user(&self, request: &RequestInfo, user: Option<User>) {
        let Some(session) = request.session_id() else {
            tracing::warn!(path = %request.path, "Cannot set user on a request without a session");
            return;
        };
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        match user {
            Some(user) => {
                tracing::debug!(session, username = %user.username, "Session user set");
                sessions.insert(session.to_string(), user);
            }
            None => {
                sessions.remove(session);
            }
        }
    }
}
