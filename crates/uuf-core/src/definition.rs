/*
 * definition.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Component definition files and inheritance merging.
 */

use serde::Deserialize;
use serde_json::{Map, Value};

/// A component's `{shortName}.json`, merged with every ancestor's.
///
/// The typed fields are a view over the raw JSON object, which is kept intact
/// (including unknown fields) and exposed to templates as `@definition`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(default)]
    pub version: Option<Version>,

    /// URI pattern a page is served under.
    #[serde(default)]
    pub uri: Option<String>,

    /// Layout name, resolved against `layouts/{name}.hbs`.
    #[serde(default)]
    pub layout: Option<String>,

    /// Full name of the parent component.
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub permissions: Vec<String>,

    /// Patterns a unit is pushed for. Checked to be an array during validation.
    #[serde(default)]
    pub pushed_uris: Option<Value>,

    /// Explicit ordering index.
    #[serde(default)]
    pub index: Option<i64>,

    #[serde(skip)]
    raw: Map<String, Value>,
}

/// Definition version, written either as a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Version {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::Text(s) => write!(f, "{}", s),
            Version::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Definition {
    /// Build the typed view of a (merged) raw definition object.
    pub fn from_raw(raw: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut definition: Definition = serde_json::from_value(Value::Object(raw.clone()))?;
        definition.raw = raw;
        Ok(definition)
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Pushed-URI patterns, or an error message when the field is not an
    /// array of strings.
    pub fn pushed_uri_patterns(&self) -> Result<Vec<String>, String> {
        let Some(value) = &self.pushed_uris else {
            return Ok(Vec::new());
        };
        let Value::Array(items) = value else {
            return Err(format!("pushedUris must be an array, found {}", value));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(format!("pushedUris entries must be strings, found {}", other)),
            })
            .collect()
    }
}

/// Merge an ancestor's definition into a descendant's.
///
/// Descendant values win. Objects merge recursively, arrays are replaced
/// wholesale and every other value only fills a gap.
pub fn merge_definitions(descendant: &Map<String, Value>, ancestor: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = descendant.clone();
    for (key, inherited) in ancestor {
        match (merged.get_mut(key), inherited) {
            (None, _) => {
                merged.insert(key.clone(), inherited.clone());
            }
            (Some(Value::Object(own)), Value::Object(theirs)) => {
                *own = merge_definitions(own, theirs);
            }
            (Some(_), _) => {}
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_descendant_scalars_win_and_gaps_fill() {
        let child = object(json!({ "version": "2.0", "extends": "ns.page.base" }));
        let parent = object(json!({ "version": "1.0", "uri": "/", "layout": "main" }));
        let merged = merge_definitions(&child, &parent);
        assert_eq!(merged["version"], "2.0");
        assert_eq!(merged["uri"], "/");
        assert_eq!(merged["layout"], "main");
    }

    #[test]
    fn test_arrays_replaced_objects_merged() {
        let child = object(json!({
            "permissions": ["a"],
            "meta": { "title": "Child" }
        }));
        let parent = object(json!({
            "permissions": ["b", "c"],
            "meta": { "title": "Parent", "author": "ops" }
        }));
        let merged = merge_definitions(&child, &parent);
        assert_eq!(merged["permissions"], json!(["a"]));
        assert_eq!(merged["meta"], json!({ "title": "Child", "author": "ops" }));
    }

    #[test]
    fn test_typed_view_keeps_unknown_fields() {
        let definition = Definition::from_raw(object(json!({
            "version": 3,
            "uri": "/home",
            "custom": { "theme": "dark" }
        })))
        .unwrap();
        assert_eq!(definition.version.as_ref().unwrap().to_string(), "3");
        assert_eq!(definition.uri.as_deref(), Some("/home"));
        assert!(!definition.disabled);
        assert_eq!(definition.raw()["custom"]["theme"], "dark");
    }

    #[test]
    fn test_pushed_uris_must_be_array() {
        let ok = Definition::from_raw(object(json!({ "pushedUris": ["/*", "/a"] }))).unwrap();
        assert_eq!(ok.pushed_uri_patterns().unwrap(), vec!["/*", "/a"]);

        let bad = Definition::from_raw(object(json!({ "pushedUris": "/*" }))).unwrap();
        assert!(bad.pushed_uri_patterns().is_err());
    }
}
