/*
 * zone.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-render zone state: what every fragment wrote into every zone.
 */

//! Zone data model.
//!
//! A [`ZoneTree`] lives for exactly one render pass. Zones are keyed by name
//! and owned by the page that first opened them. Inside a zone, each rendered
//! fragment instance has one [`ZoneContent`] entry. An entry collects one part
//! per inheritance level (depth 0 is the leaf's own template, depth 1 its
//! parent's, and so on) and applies the override rule between levels.

use std::cmp::Reverse;

use indexmap::IndexMap;

/// Zone that pushed units are rendered into.
pub const PUSHED_UNITS_ZONE: &str = "_pushedUnits";

const MARKER_START: char = '\u{E000}';
const MARKER_END: char = '\u{E001}';

/// Placeholder left in zone content where a sub-zone is read.
pub fn sub_zone_marker(name: &str) -> String {
    format!("{}{}{}", MARKER_START, name, MARKER_END)
}

/// The fragment instance a zone entry belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    /// Unique per render pass.
    pub instance: usize,
    /// Full name of the rendered leaf.
    pub name: String,
    /// Lookup index of the leaf, used for ordering.
    pub index: usize,
}

/// Parts written at successive inheritance levels.
#[derive(Debug, Clone, Default)]
pub struct Levels {
    parts: Vec<(usize, String)>,
    depth: usize,
    is_overridden: bool,
}

impl Levels {
    /// Whether a write at `depth` should be evaluated at all.
    ///
    /// Writes from the current level are always kept. A write from a more
    /// distant level is kept only when the nearer levels appended.
    pub fn admits(&self, depth: usize) -> bool {
        self.parts.is_empty() || depth <= self.depth || !self.is_overridden
    }

    pub fn record(&mut self, depth: usize, html: String, overrides: bool) {
        if self.parts.is_empty() || depth > self.depth {
            self.is_overridden = overrides;
        } else {
            self.is_overridden |= overrides;
        }
        self.depth = self.depth.max(depth);
        self.parts.push((depth, html));
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn is_overridden(&self) -> bool {
        self.is_overridden
    }

    /// Concatenate parts, furthest ancestor first.
    pub fn render(&self) -> String {
        let mut parts: Vec<&(usize, String)> = self.parts.iter().collect();
        parts.sort_by_key(|(depth, _)| Reverse(*depth));
        parts.into_iter().map(|(_, html)| html.as_str()).collect()
    }
}

/// One fragment instance's contribution to a zone.
#[derive(Debug, Clone)]
pub struct ZoneContent {
    pub provider: Provider,
    pub levels: Levels,
    /// Sub-zone writes, by sub-zone name.
    pub sub_zones: IndexMap<String, Levels>,
    /// Default markup for every sub-zone read inside this entry.
    pub placeholders: IndexMap<String, String>,
    /// Set once a protected read has consumed this entry.
    pub expired: bool,
}

impl ZoneContent {
    fn new(provider: Provider) -> Self {
        Self {
            provider,
            levels: Levels::default(),
            sub_zones: IndexMap::new(),
            placeholders: IndexMap::new(),
            expired: false,
        }
    }

    pub fn sub_zone(&self, name: &str) -> Option<&Levels> {
        self.sub_zones.get(name)
    }

    /// Levels of a sub-zone, created on first write.
    pub fn sub_zone_mut(&mut self, name: &str) -> &mut Levels {
        self.sub_zones.entry(name.to_string()).or_default()
    }

    /// Record where a sub-zone is read. The first default wins.
    pub fn add_placeholder(&mut self, name: &str, default: String) {
        self.placeholders.entry(name.to_string()).or_insert(default);
    }

    /// Final HTML with sub-zone placeholders resolved.
    pub fn render(&self) -> String {
        let mut html = self.levels.render();
        for (name, default) in &self.placeholders {
            let content = match self.sub_zones.get(name) {
                Some(levels) if !levels.is_empty() => levels.render(),
                _ => default.clone(),
            };
            html = html.replace(&sub_zone_marker(name), &content);
        }
        html
    }
}

/// A resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Css,
    Less,
    Js,
}

impl ResourceKind {
    pub fn from_helper(name: &str) -> Option<Self> {
        match name {
            "css" => Some(ResourceKind::Css),
            "less" => Some(ResourceKind::Less),
            "js" => Some(ResourceKind::Js),
            _ => None,
        }
    }

    pub fn is_style(self) -> bool {
        matches!(self, ResourceKind::Css | ResourceKind::Less)
    }

    /// Emission order: stylesheets before scripts.
    const ORDER: [ResourceKind; 3] = [ResourceKind::Css, ResourceKind::Less, ResourceKind::Js];

    /// Extension of a combined bundle. LESS bundles as CSS.
    pub fn bundle_ext(self) -> &'static str {
        if self.is_style() { "css" } else { "js" }
    }

    fn tag(self, url: &str) -> String {
        if self.is_style() {
            format!("<link href=\"{}\" rel=\"stylesheet\" type=\"text/css\" />", url)
        } else {
            format!("<script src=\"{}\" type=\"text/javascript\"></script>", url)
        }
    }
}

/// A CSS/JS asset requested by a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    /// Full name of the fragment whose template registered it (or `layouts`).
    pub provider: String,
    pub provider_index: usize,
    /// Resolved URL.
    pub url: String,
    pub combine: bool,
}

/// A top-level zone.
#[derive(Debug, Clone)]
pub struct Zone {
    owner: String,
    contents: IndexMap<usize, ZoneContent>,
    resources: Vec<Resource>,
}

impl Zone {
    fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            contents: IndexMap::new(),
            resources: Vec::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn content(&self, instance: usize) -> Option<&ZoneContent> {
        self.contents.get(&instance)
    }

    pub fn content_mut(&mut self, instance: usize) -> Option<&mut ZoneContent> {
        self.contents.get_mut(&instance)
    }

    /// The entry for a provider, created on first use.
    pub fn entry(&mut self, provider: &Provider) -> &mut ZoneContent {
        self.contents
            .entry(provider.instance)
            .or_insert_with(|| ZoneContent::new(provider.clone()))
    }

    /// Register a resource. Returns false when the same URL of the same kind is
    /// already registered in this zone.
    pub fn add_resource(&mut self, resource: Resource) -> bool {
        if self
            .resources
            .iter()
            .any(|r| r.kind == resource.kind && r.url == resource.url)
        {
            return false;
        }
        self.resources.push(resource);
        true
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// HTML of every live entry, ordered by provider index.
    pub fn render_contents(&self) -> String {
        let mut entries: Vec<&ZoneContent> = self.contents.values().filter(|c| !c.expired).collect();
        entries.sort_by_key(|c| c.provider.index);
        entries.iter().map(|c| c.render()).collect()
    }

    /// HTML of one instance's live entry, which is then marked expired.
    pub fn take_instance(&mut self, instance: usize) -> Option<String> {
        let content = self.contents.get_mut(&instance).filter(|c| !c.expired)?;
        content.expired = true;
        Some(content.render())
    }

    /// Link and script tags for this zone's resources.
    ///
    /// Resources are ordered by provider index, CSS then LESS then JS. Two or
    /// more combinable resources of one kind become a single bundle under
    /// `{public_uri}/combined/`.
    pub fn render_resources(&self, public_uri: &str) -> String {
        let mut sorted: Vec<&Resource> = self.resources.iter().collect();
        sorted.sort_by_key(|r| r.provider_index);

        let prefix = format!("{}/", public_uri);
        let mut tags = Vec::new();
        for kind in ResourceKind::ORDER {
            let of_kind: Vec<&Resource> = sorted.iter().copied().filter(|r| r.kind == kind).collect();
            let bundled: Vec<&str> = of_kind
                .iter()
                .filter(|r| r.combine)
                .filter_map(|r| r.url.strip_prefix(&prefix))
                .collect();
            let bundle = bundled.len() >= 2;

            let mut bundle_emitted = false;
            for resource in of_kind {
                let in_bundle = bundle && resource.combine && resource.url.starts_with(&prefix);
                if !in_bundle {
                    tags.push(kind.tag(&resource.url));
                } else if !bundle_emitted {
                    let url = format!("{}combined/{}.{}", prefix, bundled.join(","), kind.bundle_ext());
                    tags.push(kind.tag(&url));
                    bundle_emitted = true;
                }
            }
        }
        tags.join("\n")
    }
}

/// Every zone written during one render pass.
#[derive(Debug, Default)]
pub struct ZoneTree {
    zones: IndexMap<String, Zone>,
}

impl ZoneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.zones.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Zone> {
        self.zones.get_mut(name)
    }

    /// Open a zone on behalf of `page`, creating it if needed.
    ///
    /// Returns `None` when the zone is already owned by another page.
    pub fn open(&mut self, name: &str, page: &str) -> Option<&mut Zone> {
        let zone = self
            .zones
            .entry(name.to_string())
            .or_insert_with(|| Zone::new(page));
        (zone.owner == page).then_some(zone)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn provider(instance: usize, name: &str, index: usize) -> Provider {
        Provider {
            instance,
            name: name.to_string(),
            index,
        }
    }

    fn resource(kind: ResourceKind, url: &str, index: usize, combine: bool) -> Resource {
        Resource {
            kind,
            provider: "ns.unit.x".to_string(),
            provider_index: index,
            url: url.to_string(),
            combine,
        }
    }

    #[test]
    fn test_override_drops_distant_levels() {
        let mut levels = Levels::default();
        assert!(levels.admits(0));
        levels.record(0, "child".to_string(), true);
        assert!(levels.admits(0));
        assert!(!levels.admits(1));
        assert_eq!(levels.render(), "child");
    }

    #[test]
    fn test_append_keeps_ancestor_first() {
        let mut levels = Levels::default();
        levels.record(0, "child".to_string(), false);
        assert!(levels.admits(1));
        levels.record(1, "parent".to_string(), true);
        assert!(!levels.admits(2));
        assert_eq!(levels.render(), "parentchild");
    }

    #[test]
    fn test_same_level_writes_accumulate_override() {
        let mut levels = Levels::default();
        levels.record(0, "a".to_string(), false);
        levels.record(0, "b".to_string(), true);
        assert!(levels.is_overridden());
        assert_eq!(levels.render(), "ab");
    }

    #[test]
    fn test_zone_owned_by_first_page() {
        let mut tree = ZoneTree::new();
        assert!(tree.open("content", "ns.page.home").is_some());
        assert!(tree.open("content", "ns.page.other").is_none());
        assert!(tree.open("content", "ns.page.home").is_some());
        assert_eq!(tree.names().collect::<Vec<_>>(), vec!["content"]);
    }

    #[test]
    fn test_contents_ordered_by_provider_index() {
        let mut tree = ZoneTree::new();
        let zone = tree.open("content", "p").unwrap();
        zone.entry(&provider(1, "ns.page.p", 5)).levels.record(0, "page".to_string(), true);
        zone.entry(&provider(2, "ns.unit.u", 1)).levels.record(0, "unit".to_string(), true);
        assert_eq!(zone.render_contents(), "unitpage");
    }

    #[test]
    fn test_sub_zone_placeholders() {
        let mut content = ZoneContent::new(provider(1, "ns.unit.card", 0));
        assert!(content.sub_zone("title").is_none());
        content.sub_zone_mut("title").record(0, "Child title".to_string(), true);
        content.levels.record(
            1,
            format!("<h1>{}</h1><p>{}</p>", sub_zone_marker("title"), sub_zone_marker("body")),
            true,
        );
        content.add_placeholder("title", "Default title".to_string());
        content.add_placeholder("body", "Default body".to_string());
        assert_eq!(content.render(), "<h1>Child title</h1><p>Default body</p>");
        assert!(content.sub_zone("body").is_none());
        assert_eq!(content.sub_zones.len(), 1);
    }

    #[test]
    fn test_protected_take_expires_entry() {
        let mut tree = ZoneTree::new();
        let zone = tree.open("body", "p").unwrap();
        zone.entry(&provider(3, "ns.unit.child", 0)).levels.record(0, "x".to_string(), true);
        assert_eq!(zone.take_instance(3).as_deref(), Some("x"));
        assert_eq!(zone.take_instance(3), None);
        assert_eq!(zone.render_contents(), "");
    }

    #[test]
    fn test_resource_dedup() {
        let mut tree = ZoneTree::new();
        let zone = tree.open("content", "p").unwrap();
        assert!(zone.add_resource(resource(ResourceKind::Css, "/a/public/x.css", 0, true)));
        assert!(!zone.add_resource(resource(ResourceKind::Css, "/a/public/x.css", 1, true)));
        assert!(zone.add_resource(resource(ResourceKind::Js, "/a/public/x.css", 0, true)));
        assert_eq!(zone.resources().len(), 2);
    }

    #[test]
    fn test_resources_bundled_per_kind() {
        let mut tree = ZoneTree::new();
        let zone = tree.open("content", "p").unwrap();
        zone.add_resource(resource(ResourceKind::Js, "/a/public/ns.unit.b/b.js", 1, true));
        zone.add_resource(resource(ResourceKind::Css, "/a/public/ns.unit.b/b.css", 1, true));
        zone.add_resource(resource(ResourceKind::Less, "/a/public/ns.unit.a/a.less", 0, true));
        zone.add_resource(resource(ResourceKind::Css, "https://cdn.example.com/x.css", 2, true));
        zone.add_resource(resource(ResourceKind::Css, "/a/public/ns.unit.c/c.css", 3, true));
        zone.add_resource(resource(ResourceKind::Less, "/a/public/ns.unit.c/c.less", 3, true));
        zone.add_resource(resource(ResourceKind::Js, "/a/public/ns.unit.c/c.js", 3, false));

        let expected = [
            "<link href=\"/a/public/combined/ns.unit.b/b.css,ns.unit.c/c.css.css\" rel=\"stylesheet\" type=\"text/css\" />",
            "<link href=\"https://cdn.example.com/x.css\" rel=\"stylesheet\" type=\"text/css\" />",
            "<link href=\"/a/public/combined/ns.unit.a/a.less,ns.unit.c/c.less.css\" rel=\"stylesheet\" type=\"text/css\" />",
            "<script src=\"/a/public/ns.unit.b/b.js\" type=\"text/javascript\"></script>",
            "<script src=\"/a/public/ns.unit.c/c.js\" type=\"text/javascript\"></script>",
        ]
        .join("\n");
        assert_eq!(zone.render_resources("/a/public"), expected);
    }

    #[test]
    fn test_single_resource_of_a_kind_is_not_bundled() {
        let mut tree = ZoneTree::new();
        let zone = tree.open("content", "p").unwrap();
        zone.add_resource(resource(ResourceKind::Css, "/a/public/ns.unit.a/a.css", 0, true));
        zone.add_resource(resource(ResourceKind::Less, "/a/public/ns.unit.b/b.less", 1, true));

        let expected = [
            "<link href=\"/a/public/ns.unit.a/a.css\" rel=\"stylesheet\" type=\"text/css\" />",
            "<link href=\"/a/public/ns.unit.b/b.less\" rel=\"stylesheet\" type=\"text/css\" />",
        ]
        .join("\n");
        assert_eq!(zone.render_resources("/a/public"), expected);
    }
}
