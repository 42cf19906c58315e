//! Request path to page resolution.

use indexmap::IndexMap;

use crate::error::LoadError;
use crate::lookup::LookupTable;
use crate::uri::{UriPattern, normalize_path};

/// The result of routing a path.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub page: String,
    pub uri_params: IndexMap<String, String>,
    /// Units to render into the `_pushedUnits` zone, in order.
    pub pushed_units: Vec<String>,
}

/// Compiled page and pushed-unit patterns of one lookup table.
#[derive(Debug, Clone, Default)]
pub struct Routes {
    pages: Vec<(UriPattern, String)>,
    pushed: Vec<(UriPattern, Vec<String>)>,
}

impl Routes {
    pub fn compile(lookup: &LookupTable) -> Result<Self, LoadError> {
        let pages = lookup
            .uri_pages
            .iter()
            .map(|(uri, page)| Ok((UriPattern::compile(uri)?, page.clone())))
            .collect::<Result<Vec<_>, LoadError>>()?;
        let pushed = lookup
            .pushed_units
            .iter()
            .map(|(uri, units)| Ok((UriPattern::compile(uri)?, units.clone())))
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(Self { pages, pushed })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Match an app-relative path.
    ///
    /// The first registered page pattern that matches wins. Pushed units are
    /// collected from every matching pushed pattern, without duplicates.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let (uri_params, page) = self
            .pages
            .iter()
            .find_map(|(pattern, page)| pattern.matches(path).map(|params| (params, page)))?;

        let mut pushed_units: Vec<String> = Vec::new();
        for (pattern, units) in &self.pushed {
            if pattern.matches(path).is_none() {
                continue;
            }
            for unit in units {
                if !pushed_units.contains(unit) {
                    pushed_units.push(unit.clone());
                }
            }
        }

        Some(RouteMatch {
            page: page.clone(),
            uri_params,
            pushed_units,
        })
    }
}

/// Strip the leading `/{app}` segment from a request path.
///
/// Returns `None` when the path does not belong to the app.
pub fn app_relative<'p>(app_name: &str, path: &'p str) -> Option<&'p str> {
    let rest = path.strip_prefix('/')?.strip_prefix(app_name)?;
    if rest.is_empty() {
        return Some("/");
    }
    rest.starts_with('/').then(|| normalize_path(rest))
}
