//! The parts of an HTTP request the engine looks at.

use indexmap::IndexMap;

use crate::identity::SESSION_COOKIE;

/// An incoming request, decoupled from any HTTP library.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: String,
    /// Full request path, including the leading app segment.
    pub path: String,
    /// Decoded query parameters.
    pub query: IndexMap<String, String>,
    /// Headers with lower-cased names.
    pub headers: IndexMap<String, String>,
}

impl RequestInfo {
    /// A `GET` request for `path` with no query or headers.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.into(),
            query: IndexMap::new(),
            headers: IndexMap::new(),
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Value of a cookie from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.cookie(SESSION_COOKIE)
    }
}
