/*
 * lookup.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Component discovery, inheritance resolution and the lookup table.
 */

//! Lookup table.
//!
//! The table is built in one go from an app's `layouts/`, `units/` and
//! `pages/` directories:
//!
//! 1. Discover components and read their definitions.
//! 2. Resolve each component's `extends` chain and merge definitions.
//! 3. Order components (units first, then pages).
//! 4. Validate in that order, failing on the first violation.
//! 5. Index renderable pages by URI and renderable units by pushed URI.
//!
//! The result is immutable; a configuration change produces a new table.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::component::{ComponentKind, UiComponent, split_full_name};
use crate::definition::{Definition, merge_definitions};
use crate::error::LoadError;
use crate::script::ScriptRegistry;
use crate::source::FileSource;
use crate::uri::UriPattern;

const LAYOUTS_DIR: &str = "layouts";
const TEMPLATE_EXT: &str = "hbs";
const SCRIPT_EXT: &str = "js";
const DEFINITION_EXT: &str = "json";

/// Immutable index of an app's layouts, pages and units.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    /// Layout name to template path.
    pub layouts: IndexMap<String, PathBuf>,
    /// Pages in index order.
    pub pages: IndexMap<String, UiComponent>,
    /// Units in index order.
    pub units: IndexMap<String, UiComponent>,
    /// URI pattern to page full name, in page index order.
    pub uri_pages: IndexMap<String, String>,
    /// URI pattern to the units pushed for it, in unit index order.
    pub pushed_units: IndexMap<String, Vec<String>>,
}

/// A component directory as found on disk.
#[derive(Debug)]
struct Discovered {
    full_name: String,
    short_name: String,
    namespace: String,
    path: PathBuf,
    raw: Map<String, Value>,
    template_path: Option<PathBuf>,
    script_path: Option<PathBuf>,
}

impl LookupTable {
    /// Build a table from an app's files.
    pub fn build(source: &dyn FileSource, scripts: &ScriptRegistry) -> Result<Self, LoadError> {
        let layouts = discover_layouts(source)?;

        let mut units = build_kind(source, ComponentKind::Unit)?;
        let mut pages = build_kind(source, ComponentKind::Page)?;

        // Units are numbered first, then pages
        for (i, unit) in units.values_mut().enumerate() {
            unit.index = i;
        }
        let offset = units.len();
        for (i, page) in pages.values_mut().enumerate() {
            page.index = offset + i;
        }

        for unit in units.values() {
            validate_unit(unit)?;
        }
        for page in pages.values() {
            validate_page(page, &layouts)?;
        }

        let mut uri_pages: IndexMap<String, String> = IndexMap::new();
        for page in pages.values().filter(|p| p.is_renderable()) {
            let Some(uri) = &page.definition.uri else {
                continue;
            };
            match uri_pages.get(uri) {
                Some(existing) => warn!(
                    uri = %uri,
                    kept = %existing,
                    ignored = %page.full_name,
                    "Duplicate page URI, keeping the first page"
                ),
                None => {
                    uri_pages.insert(uri.clone(), page.full_name.clone());
                }
            }
        }

        let mut pushed_units: IndexMap<String, Vec<String>> = IndexMap::new();
        for unit in units.values().filter(|u| u.is_renderable()) {
            for pattern in unit.definition.pushed_uri_patterns().unwrap_or_default() {
                pushed_units
                    .entry(pattern)
                    .or_default()
                    .push(unit.full_name.clone());
            }
        }

        for component in units.values().chain(pages.values()) {
            if component.script_path.is_some() && !scripts.contains(&component.full_name) {
                warn!(
                    component = %component.full_name,
                    "Script file present but no handler is registered"
                );
            }
        }

        info!(
            layouts = layouts.len(),
            units = units.len(),
            pages = pages.len(),
            routes = uri_pages.len(),
            "Built lookup table"
        );

        Ok(Self {
            layouts,
            pages,
            units,
            uri_pages,
            pushed_units,
        })
    }

    pub fn components(&self, kind: ComponentKind) -> &IndexMap<String, UiComponent> {
        match kind {
            ComponentKind::Unit => &self.units,
            ComponentKind::Page => &self.pages,
        }
    }

    pub fn component(&self, kind: ComponentKind, full_name: &str) -> Option<&UiComponent> {
        self.components(kind).get(full_name)
    }

    pub fn layout(&self, name: &str) -> Option<&Path> {
        self.layouts.get(name).map(PathBuf::as_path)
    }

    /// Resolve a component name to the leaf that actually renders.
    ///
    /// That is the descendant with the longest extension chain below the named
    /// component. Leaves tied at that distance are reported and the lexically
    /// first one is used.
    pub fn furthest_child(&self, kind: ComponentKind, full_name: &str) -> Option<&UiComponent> {
        let components = self.components(kind);
        let start = components.get(full_name)?;

        let mut leaves: Vec<(usize, &UiComponent)> = Vec::new();
        let mut stack = vec![(start, 0usize)];
        while let Some((component, distance)) = stack.pop() {
            if component.is_leaf() {
                leaves.push((distance, component));
                continue;
            }
            for child in &component.children {
                if let Some(child) = components.get(child) {
                    stack.push((child, distance + 1));
                }
            }
        }

        let furthest = leaves.iter().map(|(d, _)| *d).max()?;
        let mut tied: Vec<&UiComponent> = leaves
            .into_iter()
            .filter(|(d, _)| *d == furthest)
            .map(|(_, c)| c)
            .collect();
        tied.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        tied.dedup_by(|a, b| a.full_name == b.full_name);

        if tied.len() > 1 {
            let excluded: Vec<&str> = tied[1..].iter().map(|c| c.full_name.as_str()).collect();
            warn!(
                component = %full_name,
                chosen = %tied[0].full_name,
                excluded = ?excluded,
                "Several furthest children at the same distance"
            );
        }
        tied.first().copied()
    }
}

fn discover_layouts(source: &dyn FileSource) -> Result<IndexMap<String, PathBuf>, LoadError> {
    let dir = Path::new(LAYOUTS_DIR);
    let mut layouts = IndexMap::new();
    if !source.is_dir(dir) {
        return Ok(layouts);
    }
    for name in list_dir(source, dir)? {
        let path = dir.join(&name);
        if let Some(stem) = name.strip_suffix(&format!(".{}", TEMPLATE_EXT)) {
            debug!(layout = stem, "Discovered layout");
            layouts.insert(stem.to_string(), path);
        }
    }
    Ok(layouts)
}

fn list_dir(source: &dyn FileSource, dir: &Path) -> Result<Vec<String>, LoadError> {
    source.list_dir(dir).map_err(|e| LoadError::Io {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Find every component of one kind, keyed by full name.
fn discover(source: &dyn FileSource, kind: ComponentKind) -> Result<BTreeMap<String, Discovered>, LoadError> {
    let dir = Path::new(kind.dir());
    let mut found = BTreeMap::new();
    if !source.is_dir(dir) {
        return Ok(found);
    }

    for full_name in list_dir(source, dir)? {
        let path = dir.join(&full_name);
        if !source.is_dir(&path) {
            continue;
        }
        let Some((namespace, short_name)) = split_full_name(&full_name) else {
            return Err(LoadError::InvalidComponentName(full_name));
        };

        let definition_path = path.join(format!("{}.{}", short_name, DEFINITION_EXT));
        if !source.exists(&definition_path) {
            return Err(LoadError::MissingDefinition {
                kind,
                component: full_name.clone(),
                path: definition_path,
            });
        }
        let text = source.read_all(&definition_path).map_err(|e| LoadError::Io {
            path: definition_path.clone(),
            source: e,
        })?;
        let raw = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(LoadError::Invalid {
                    kind,
                    component: full_name.clone(),
                    chain: vec![full_name.clone()],
                    reason: "definition must be a JSON object".to_string(),
                });
            }
            Err(e) => {
                return Err(LoadError::Json {
                    path: definition_path,
                    source: e,
                });
            }
        };

        let optional = |ext: &str| {
            let file = path.join(format!("{}.{}", short_name, ext));
            source.exists(&file).then_some(file)
        };

        debug!(%kind, component = %full_name, "Discovered component");
        found.insert(
            full_name.clone(),
            Discovered {
                template_path: optional(TEMPLATE_EXT),
                script_path: optional(SCRIPT_EXT),
                short_name: short_name.to_string(),
                namespace: namespace.to_string(),
                full_name,
                path,
                raw,
            },
        );
    }
    Ok(found)
}

fn extends_of(raw: &Map<String, Value>) -> Option<&str> {
    raw.get("extends").and_then(Value::as_str)
}

/// Walk every component's `extends` chain, nearest parent first.
fn resolve_parents(
    kind: ComponentKind,
    discovered: &BTreeMap<String, Discovered>,
) -> Result<HashMap<String, Vec<String>>, LoadError> {
    let mut all = HashMap::new();
    for (name, component) in discovered {
        let mut chain = vec![name.clone()];
        let mut current = component;
        while let Some(parent) = extends_of(&current.raw) {
            if chain.iter().any(|c| c == parent) {
                chain.push(parent.to_string());
                return Err(LoadError::CyclicInheritance { chain });
            }
            let Some(next) = discovered.get(parent) else {
                return Err(LoadError::MissingParent {
                    kind,
                    component: current.full_name.clone(),
                    parent: parent.to_string(),
                });
            };
            chain.push(parent.to_string());
            current = next;
        }
        chain.remove(0);
        all.insert(name.clone(), chain);
    }
    Ok(all)
}

/// Discover, link, merge and order all components of one kind.
fn build_kind(source: &dyn FileSource, kind: ComponentKind) -> Result<IndexMap<String, UiComponent>, LoadError> {
    let discovered = discover(source, kind)?;
    let parents = resolve_parents(kind, &discovered)?;

    let mut children: HashMap<&str, Vec<String>> = HashMap::new();
    for (name, chain) in &parents {
        if let Some(parent) = chain.first() {
            children.entry(parent.as_str()).or_default().push(name.clone());
        }
    }

    let mut components: HashMap<String, UiComponent> = HashMap::new();
    for (name, found) in &discovered {
        let chain = parents.get(name).cloned().unwrap_or_default();
        let mut merged = found.raw.clone();
        for ancestor in &chain {
            if let Some(ancestor) = discovered.get(ancestor) {
                merged = merge_definitions(&merged, &ancestor.raw);
            }
        }
        let definition = Definition::from_raw(merged).map_err(|e| LoadError::Invalid {
            kind,
            component: name.clone(),
            chain: std::iter::once(name.clone()).chain(chain.iter().cloned()).collect(),
            reason: e.to_string(),
        })?;

        let mut direct_children = children.remove(name.as_str()).unwrap_or_default();
        direct_children.sort();

        components.insert(
            name.clone(),
            UiComponent {
                kind,
                full_name: found.full_name.clone(),
                short_name: found.short_name.clone(),
                namespace: found.namespace.clone(),
                path: found.path.clone(),
                definition,
                template_path: found.template_path.clone(),
                script_path: found.script_path.clone(),
                parents: chain,
                children: direct_children,
                index: 0,
            },
        );
    }

    let order = order_components(&components);
    let mut ordered = IndexMap::with_capacity(order.len());
    for name in order {
        if let Some(component) = components.remove(&name) {
            ordered.insert(name, component);
        }
    }
    Ok(ordered)
}

/// Deterministic total order of one kind's components.
///
/// Components are grouped by explicit `index` (ascending, absent = 0). Within a
/// group the order is lexical by full name, except that a descendant always
/// comes before any of its ancestors in the same group.
fn order_components(components: &HashMap<String, UiComponent>) -> Vec<String> {
    let mut groups: BTreeMap<i64, BTreeSet<&str>> = BTreeMap::new();
    for (name, component) in components {
        groups
            .entry(component.definition.index.unwrap_or(0))
            .or_default()
            .insert(name.as_str());
    }

    let mut order = Vec::with_capacity(components.len());
    for members in groups.values() {
        let ancestors_in_group = |name: &str| -> Vec<&str> {
            components
                .get(name)
                .map(|c| {
                    c.parents
                        .iter()
                        .map(String::as_str)
                        .filter(|p| members.contains(p))
                        .collect()
                })
                .unwrap_or_default()
        };

        // Number of descendants in the group still waiting to be placed
        let mut waiting: HashMap<&str, usize> = HashMap::new();
        for name in members {
            for ancestor in ancestors_in_group(name) {
                *waiting.entry(ancestor).or_default() += 1;
            }
        }

        let mut ready: BTreeSet<&str> = members
            .iter()
            .copied()
            .filter(|name| !waiting.contains_key(name))
            .collect();

        while let Some(next) = ready.pop_first() {
            order.push(next.to_string());
            for ancestor in ancestors_in_group(next) {
                if let Some(count) = waiting.get_mut(ancestor) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(ancestor);
                    }
                }
            }
        }
    }
    order
}

fn invalid(component: &UiComponent, reason: impl Into<String>) -> LoadError {
    LoadError::Invalid {
        kind: component.kind,
        component: component.full_name.clone(),
        chain: component.chain().map(str::to_string).collect(),
        reason: reason.into(),
    }
}

fn validate_unit(unit: &UiComponent) -> Result<(), LoadError> {
    if unit.definition.version.is_none() {
        return Err(invalid(unit, "missing version"));
    }
    let patterns = unit
        .definition
        .pushed_uri_patterns()
        .map_err(|reason| invalid(unit, reason))?;
    for pattern in patterns {
        UriPattern::compile(&pattern).map_err(|e| invalid(unit, e.to_string()))?;
    }
    Ok(())
}

/// Every page's merged definition must carry a version, a URI pattern and a
/// layout that exists, whether or not the page has children.
fn validate_page(page: &UiComponent, layouts: &IndexMap<String, PathBuf>) -> Result<(), LoadError> {
    let definition = &page.definition;
    if definition.version.is_none() {
        return Err(invalid(page, "missing version"));
    }
    match &definition.uri {
        Some(uri) => {
            UriPattern::compile(uri).map_err(|e| invalid(page, e.to_string()))?;
        }
        None => return Err(invalid(page, "missing uri")),
    }
    match &definition.layout {
        Some(layout) if !layouts.contains_key(layout) => {
            return Err(invalid(page, format!("unknown layout '{}'", layout)));
        }
        Some(_) => {}
        None => return Err(invalid(page, "missing layout")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use pretty_assertions::assert_eq;

    fn unit(source: &MemorySource, name: &str, definition: &str) {
        let short = name.rsplit('.').next().unwrap();
        source.insert(format!("units/{}/{}.json", name, short), definition);
    }

    fn page(source: &MemorySource, name: &str, definition: &str) {
        let short = name.rsplit('.').next().unwrap();
        source.insert(format!("pages/{}/{}.json", name, short), definition);
    }

    fn build(source: &MemorySource) -> Result<LookupTable, LoadError> {
        LookupTable::build(source, &ScriptRegistry::new())
    }

    fn names(map: &IndexMap<String, UiComponent>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_empty_app() {
        let table = build(&MemorySource::new()).unwrap();
        assert!(table.pages.is_empty());
        assert!(table.units.is_empty());
    }

    #[test]
    fn test_inherited_definition_and_chain() {
        let source = MemorySource::new().with_file("layouts/main.hbs", "");
        page(&source, "ns.page.base", r#"{"version": "1.0", "uri": "/base", "layout": "main", "title": "Base"}"#);
        page(&source, "ns.page.home", r#"{"extends": "ns.page.base", "uri": "/"}"#);
        page(&source, "ns.page.special", r#"{"extends": "ns.page.home", "version": "2.0"}"#);

        let table = build(&source).unwrap();
        let special = &table.pages["ns.page.special"];
        assert_eq!(special.parents, vec!["ns.page.home", "ns.page.base"]);
        assert_eq!(special.definition.version.as_ref().unwrap().to_string(), "2.0");
        assert_eq!(special.definition.uri.as_deref(), Some("/"));
        assert_eq!(special.definition.layout.as_deref(), Some("main"));
        assert_eq!(special.definition.raw()["title"], "Base");

        assert_eq!(table.pages["ns.page.base"].children, vec!["ns.page.home"]);
        assert_eq!(table.pages["ns.page.home"].children, vec!["ns.page.special"]);

        // Only the leaf is routable
        assert_eq!(table.uri_pages.get("/").map(String::as_str), Some("ns.page.special"));
        assert_eq!(table.uri_pages.len(), 1);
    }

    #[test]
    fn test_missing_definition() {
        let source = MemorySource::new().with_file("units/ns.unit.a/a.hbs", "x");
        let err = build(&source).unwrap_err();
        assert!(matches!(err, LoadError::MissingDefinition { ref component, .. } if component == "ns.unit.a"));
    }

    #[test]
    fn test_missing_parent() {
        let source = MemorySource::new();
        unit(&source, "ns.unit.a", r#"{"version": 1, "extends": "ns.unit.ghost"}"#);
        let err = build(&source).unwrap_err();
        assert_eq!(err.to_string(), "unit 'ns.unit.a' extends unknown unit 'ns.unit.ghost'");
    }

    #[test]
    fn test_parent_must_be_same_kind() {
        let source = MemorySource::new().with_file("layouts/main.hbs", "");
        unit(&source, "ns.shared.base", r#"{"version": 1}"#);
        page(&source, "ns.page.home", r#"{"version": 1, "uri": "/", "layout": "main", "extends": "ns.shared.base"}"#);
        assert!(matches!(build(&source).unwrap_err(), LoadError::MissingParent { .. }));
    }

    #[test]
    fn test_cycle_detected() {
        let source = MemorySource::new();
        unit(&source, "ns.unit.a", r#"{"version": 1, "extends": "ns.unit.b"}"#);
        unit(&source, "ns.unit.b", r#"{"version": 1, "extends": "ns.unit.a"}"#);
        let err = build(&source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cyclic inheritance: ns.unit.a -> ns.unit.b -> ns.unit.a"
        );
    }

    #[test]
    fn test_page_without_version_names_chain() {
        let source = MemorySource::new().with_file("layouts/main.hbs", "");
        page(&source, "ns.page.base", r#"{"uri": "/base", "layout": "main"}"#);
        page(&source, "ns.page.home", r#"{"extends": "ns.page.base", "uri": "/"}"#);
        let err = build(&source).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ns.page.home"), "{}", message);
        assert!(message.contains("ns.page.home -> ns.page.base"), "{}", message);
        assert!(message.contains("missing version"), "{}", message);
    }

    #[test]
    fn test_base_page_needs_uri_and_layout() {
        let source = MemorySource::new().with_file("layouts/main.hbs", "");
        page(&source, "ns.page.base", r#"{"version": 1}"#);
        page(&source, "ns.page.home", r#"{"extends": "ns.page.base", "uri": "/", "layout": "main"}"#);
        let err = build(&source).unwrap_err();
        assert!(
            matches!(err, LoadError::Invalid { ref component, ref reason, .. }
                if component == "ns.page.base" && reason == "missing uri"),
            "{}",
            err
        );

        page(&source, "ns.page.base", r#"{"version": 1, "uri": "/base"}"#);
        let err = build(&source).unwrap_err();
        assert!(
            matches!(err, LoadError::Invalid { ref component, ref reason, .. }
                if component == "ns.page.base" && reason == "missing layout"),
            "{}",
            err
        );

        page(&source, "ns.page.base", r#"{"version": 1, "uri": "/base", "layout": "main"}"#);
        assert!(build(&source).is_ok());
    }

    #[test]
    fn test_disabled_page_not_routable() {
        let source = MemorySource::new().with_file("layouts/main.hbs", "");
        page(&source, "ns.page.home", r#"{"version": 1, "uri": "/", "layout": "main"}"#);
        page(&source, "ns.page.old", r#"{"version": 1, "uri": "/old", "layout": "main", "disabled": true}"#);
        let table = build(&source).unwrap();
        assert!(table.pages.contains_key("ns.page.old"));
        assert_eq!(table.uri_pages.get("/").map(String::as_str), Some("ns.page.home"));
        assert!(table.uri_pages.get("/old").is_none());
        assert_eq!(table.uri_pages.len(), 1);
    }

    #[test]
    fn test_unknown_layout() {
        let source = MemorySource::new();
        page(&source, "ns.page.home", r#"{"version": 1, "uri": "/", "layout": "nope"}"#);
        let err = build(&source).unwrap_err();
        assert!(err.to_string().contains("unknown layout 'nope'"));
    }

    #[test]
    fn test_pushed_uris_must_be_array() {
        let source = MemorySource::new();
        unit(&source, "ns.unit.banner", r#"{"version": 1, "pushedUris": "/*"}"#);
        let err = build(&source).unwrap_err();
        assert!(err.to_string().contains("pushedUris must be an array"));
    }

    #[test]
    fn test_ordering_index_then_descendants_then_name() {
        let source = MemorySource::new();
        unit(&source, "ns.unit.a", r#"{"version": 1}"#);
        unit(&source, "ns.unit.z", r#"{"version": 1, "extends": "ns.unit.a"}"#);
        unit(&source, "ns.unit.m", r#"{"version": 1}"#);
        unit(&source, "ns.unit.first", r#"{"version": 1, "index": -5}"#);
        unit(&source, "ns.unit.last", r#"{"version": 1, "index": 10}"#);

        let table = build(&source).unwrap();
        // `z` extends `a`, so it precedes `a` even though it sorts after it
        assert_eq!(
            names(&table.units),
            vec!["ns.unit.first", "ns.unit.m", "ns.unit.z", "ns.unit.a", "ns.unit.last"]
        );
        let indices: Vec<usize> = table.units.values().map(|u| u.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_units_numbered_before_pages() {
        let source = MemorySource::new().with_file("layouts/main.hbs", "");
        unit(&source, "ns.unit.a", r#"{"version": 1}"#);
        page(&source, "ns.page.a", r#"{"version": 1, "uri": "/", "layout": "main"}"#);
        let table = build(&source).unwrap();
        assert_eq!(table.units["ns.unit.a"].index, 0);
        assert_eq!(table.pages["ns.page.a"].index, 1);
    }

    #[test]
    fn test_pushed_units_and_exclusions() {
        let source = MemorySource::new();
        unit(&source, "ns.unit.banner", r#"{"version": 1, "pushedUris": ["/*"]}"#);
        unit(&source, "ns.unit.off", r#"{"version": 1, "pushedUris": ["/*"], "disabled": true}"#);
        unit(&source, "ns.unit.nav", r#"{"version": 1, "pushedUris": ["/*", "/admin/*"]}"#);
        let table = build(&source).unwrap();
        assert_eq!(
            table.pushed_units["/*"],
            vec!["ns.unit.banner".to_string(), "ns.unit.nav".to_string()]
        );
        assert_eq!(table.pushed_units["/admin/*"], vec!["ns.unit.nav".to_string()]);
        assert!(table.units.contains_key("ns.unit.off"));
    }

    #[test]
    fn test_duplicate_uri_keeps_first() {
        let source = MemorySource::new().with_file("layouts/main.hbs", "");
        page(&source, "ns.page.b", r#"{"version": 1, "uri": "/", "layout": "main"}"#);
        page(&source, "ns.page.a", r#"{"version": 1, "uri": "/", "layout": "main"}"#);
        let table = build(&source).unwrap();
        assert_eq!(table.uri_pages["/"], "ns.page.a");
    }

    #[test]
    fn test_furthest_child() {
        let source = MemorySource::new();
        unit(&source, "ns.unit.root", r#"{"version": 1}"#);
        unit(&source, "ns.unit.mid", r#"{"extends": "ns.unit.root"}"#);
        unit(&source, "ns.unit.deep", r#"{"extends": "ns.unit.mid"}"#);
        unit(&source, "ns.unit.shallow", r#"{"extends": "ns.unit.root"}"#);
        unit(&source, "ns.unit.other", r#"{"extends": "ns.unit.mid"}"#);
        let table = build(&source).unwrap();

        // `deep` and `other` are tied at distance 2; the lexically first wins
        let leaf = table.furthest_child(ComponentKind::Unit, "ns.unit.root").unwrap();
        assert_eq!(leaf.full_name, "ns.unit.deep");

        let leaf = table.furthest_child(ComponentKind::Unit, "ns.unit.shallow").unwrap();
        assert_eq!(leaf.full_name, "ns.unit.shallow");

        assert!(table.furthest_child(ComponentKind::Unit, "ns.unit.ghost").is_none());
    }

    #[test]
    fn test_template_and_script_paths() {
        let source = MemorySource::new()
            .with_file("units/ns.unit.a/a.json", r#"{"version": 1}"#)
            .with_file("units/ns.unit.a/a.hbs", "<p>a</p>")
            .with_file("units/ns.unit.a/a.js", "");
        let table = build(&source).unwrap();
        let a = &table.units["ns.unit.a"];
        assert_eq!(a.template_path.as_deref(), Some(Path::new("units/ns.unit.a/a.hbs")));
        assert_eq!(a.script_path.as_deref(), Some(Path::new("units/ns.unit.a/a.js")));
        assert_eq!(a.namespace, "ns.unit");
        assert_eq!(a.short_name, "a");
    }
}
