/*
 * uri.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * URI pattern compilation and matching.
 */

//! URI patterns.
//!
//! A pattern is a `/`-separated list of segments. Each segment is one of:
//!
//! - a literal: `about`
//! - a single-segment parameter: `{id}`
//! - a rest parameter that may span segments: `{+path}`
//! - a trailing wildcard matching anything, including nothing: `*`

use indexmap::IndexMap;
use regex::Regex;

use crate::error::LoadError;

/// A compiled URI pattern.
#[derive(Debug, Clone)]
pub struct UriPattern {
    pattern: String,
    regex: Regex,
    names: Vec<String>,
}

impl UriPattern {
    pub fn compile(pattern: &str) -> Result<Self, LoadError> {
        let error = |reason: &str| LoadError::UriPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(error("must start with '/'"));
        }

        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut expr = String::from("^");
        let mut names = Vec::new();

        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            if *segment == "*" {
                if !last {
                    return Err(error("'*' is only allowed as the last segment"));
                }
                expr.push_str("(?:/.*)?");
            } else if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                let (name, rest) = match inner.strip_prefix('+') {
                    Some(name) => (name, true),
                    None => (inner, false),
                };
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
                    return Err(error("parameter names must be non-empty identifiers"));
                }
                expr.push_str(if rest { "/(.+)" } else { "/([^/]+)" });
                names.push(name.to_string());
            } else if segment.contains(['{', '}', '*']) {
                return Err(error("parameters and wildcards must span a whole segment"));
            } else {
                expr.push('/');
                expr.push_str(&regex::escape(segment));
            }
        }

        if segments.is_empty() {
            expr.push('/');
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| error(&e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Match a request path, returning parameter values in pattern order.
    pub fn matches(&self, path: &str) -> Option<IndexMap<String, String>> {
        let captures = self.regex.captures(normalize_path(path))?;
        Some(
            self.names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = captures.get(i + 1).map_or("", |m| m.as_str());
                    (name.clone(), value.to_string())
                })
                .collect(),
        )
    }
}

/// Drop a trailing slash, keeping the root path `/` intact.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
