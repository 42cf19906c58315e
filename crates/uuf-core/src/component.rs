//! Pages and units.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::definition::Definition;

/// Whether a component is a page or a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Unit,
    Page,
}

impl ComponentKind {
    /// Directory holding components of this kind.
    pub fn dir(self) -> &'static str {
        match self {
            ComponentKind::Unit => "units",
            ComponentKind::Page => "pages",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Unit => write!(f, "unit"),
            ComponentKind::Page => write!(f, "page"),
        }
    }
}

/// A page or unit as recorded in the lookup table.
#[derive(Debug, Clone)]
pub struct UiComponent {
    pub kind: ComponentKind,
    /// `{namespace}.{shortName}`, unique per kind.
    pub full_name: String,
    pub short_name: String,
    pub namespace: String,
    /// Component directory, relative to the app root.
    pub path: PathBuf,
    /// Own definition merged with every ancestor's.
    pub definition: Definition,
    pub template_path: Option<PathBuf>,
    pub script_path: Option<PathBuf>,
    /// Full inheritance chain, nearest ancestor first.
    pub parents: Vec<String>,
    /// Direct children only.
    pub children: Vec<String>,
    /// Global ordering position. Units are numbered before pages.
    pub index: usize,
}

impl UiComponent {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Enabled leaves are the only components routes and pushes refer to.
    pub fn is_renderable(&self) -> bool {
        self.is_leaf() && !self.definition.disabled
    }

    /// This component followed by its ancestors, nearest first.
    pub fn chain(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.full_name.as_str()).chain(self.parents.iter().map(String::as_str))
    }
}

/// Split `{namespace}.{shortName}` at its last dot.
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (namespace, short_name) = full_name.rsplit_once('.')?;
    if namespace.is_empty() || short_name.is_empty() {
        return None;
    }
    Some((namespace, short_name))
}
