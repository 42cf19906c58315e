/*
 * compose.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The render pass: fragment resolution and the zone helpers.
 */

//! Composition engine.
//!
//! A [`RenderPass`] renders one request. Templates are plain Handlebars; the
//! pass builds a registry whose `unit`, `page`, `zone`, `defineZone`, `css`,
//! `js` and `less` helpers all borrow the pass and share its state (zone tree,
//! template cache, instance counter).
//!
//! Handlebars' render context cannot carry host data, so the pass keeps a
//! stack of [`Frame`]s describing where in the fragment tree the template
//! being evaluated sits. A frame is pushed around every template and every
//! zone body and popped on the way out, whether rendering succeeded or not.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderErrorReason,
    Renderable, Template,
};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::component::{ComponentKind, UiComponent};
use crate::config::AppConfig;
use crate::error::RenderError;
use crate::identity::{User, is_permitted};
use crate::lookup::LookupTable;
use crate::request::RequestInfo;
use crate::script::{ScriptEnv, ScriptRegistry};
use crate::source::FileSource;
use crate::zone::{PUSHED_UNITS_ZONE, Provider, Resource, ResourceKind, ZoneTree, sub_zone_marker};

/// Owner segment of resource URLs registered from layouts.
const LAYOUTS_OWNER: &str = "layouts";

/// Read-only inputs of a render pass.
#[derive(Clone, Copy)]
pub struct RenderEnv<'a> {
    pub app_name: &'a str,
    pub config: &'a AppConfig,
    pub lookup: &'a LookupTable,
    pub scripts: &'a ScriptRegistry,
    pub source: &'a dyn FileSource,
    pub request: &'a RequestInfo,
    pub uri_params: &'a IndexMap<String, String>,
    pub user: Option<&'a User>,
}

/// Whose template is being evaluated.
#[derive(Debug, Clone)]
enum Writer {
    Component { name: String, index: usize },
    Layout,
}

/// Position of a template evaluation in the fragment tree.
#[derive(Debug, Clone)]
struct Frame {
    /// Page that owns zones opened from here.
    page: String,
    /// Fragment instance zone writes are attributed to.
    instance: Provider,
    /// Whether `instance` is a unit.
    in_unit: bool,
    writer: Writer,
    /// Distance of `writer` from the rendered leaf.
    depth: usize,
    /// Open zone and, at most, one open sub-zone.
    open_zones: Vec<String>,
    /// Sub-zone blocks met directly inside the open zone, admitted or not.
    sub_zone_blocks: usize,
}

#[derive(Default)]
struct PassState {
    templates: HashMap<PathBuf, Arc<Template>>,
    zones: ZoneTree,
    next_instance: usize,
    /// Leaves currently being rendered, outermost first.
    active: Vec<String>,
    frames: Vec<Frame>,
    /// First error raised by a helper. Handlebars only carries a message
    /// back up, so the typed error waits here.
    failure: Option<RenderError>,
}

/// State of one render pass.
pub struct RenderPass<'a> {
    env: RenderEnv<'a>,
    public_uri: String,
    state: Mutex<PassState>,
}

impl<'a> RenderPass<'a> {
    pub fn new(env: RenderEnv<'a>) -> Self {
        Self {
            public_uri: env.config.public_uri(env.app_name),
            env,
            state: Mutex::new(PassState::default()),
        }
    }

    /// Render a routed page: pushed units, then the page's template chain,
    /// then its layout. Only the layout's output is returned.
    pub fn render_page(&self, page: &str, pushed_units: &[String]) -> Result<String, RenderError> {
        let lookup = self.env.lookup;
        let leaf = resolve(lookup, ComponentKind::Page, page)?;
        debug!(page = %leaf.full_name, pushed = pushed_units.len(), "Rendering page");

        let registry = self.registry();
        let provider = self.next_provider(leaf);
        let owner = leaf.full_name.clone();

        for unit in pushed_units {
            let Some((unit_provider, html)) = self.render_unit(&registry, &owner, unit, &Value::Null)? else {
                continue;
            };
            if html.is_empty() {
                continue;
            }
            if let Some(zone) = self.state().zones.open(PUSHED_UNITS_ZONE, &owner) {
                zone.entry(&unit_provider).levels.record(0, html, false);
            }
        }

        let ctx = self.context_for(leaf, &Value::Null)?;
        self.state().active.push(leaf.full_name.clone());
        let result = self.render_chain(&registry, leaf, &owner, &provider, &ctx);
        self.state().active.pop();
        result?;

        let layout_name = leaf.definition.layout.as_deref().unwrap_or_default();
        let layout = lookup
            .layout(layout_name)
            .ok_or_else(|| RenderError::UnknownLayout {
                page: leaf.full_name.clone(),
                layout: layout_name.to_string(),
            })?;
        let frame = Frame {
            page: owner,
            instance: provider,
            in_unit: false,
            writer: Writer::Layout,
            depth: leaf.parents.len() + 1,
            open_zones: Vec::new(),
            sub_zone_blocks: 0,
        };
        self.render_template(&registry, layout, frame, &ctx)
    }

    fn state(&self) -> MutexGuard<'_, PassState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A registry holding only the composition helpers, each borrowing this pass.
    fn registry(&self) -> Handlebars<'_> {
        let mut registry = Handlebars::new();
        let helpers = [
            ("unit", Op::Unit),
            ("page", Op::Page),
            ("zone", Op::Zone),
            ("defineZone", Op::DefineZone),
            ("css", Op::Resource(ResourceKind::Css)),
            ("js", Op::Resource(ResourceKind::Js)),
            ("less", Op::Resource(ResourceKind::Less)),
        ];
        for (name, op) in helpers {
            registry.register_helper(name, Box::new(ComposeHelper { pass: self, op }));
        }
        registry
    }

    /// Render a unit on behalf of `page`.
    ///
    /// Returns `None` when the unit is not processable (disabled, or the
    /// current user lacks one of its permissions).
    fn render_unit(
        &self,
        registry: &Handlebars<'_>,
        page: &str,
        name: &str,
        params: &Value,
    ) -> Result<Option<(Provider, String)>, RenderError> {
        let leaf = resolve(self.env.lookup, ComponentKind::Unit, name)?;
        if !self.is_processable(leaf) {
            debug!(unit = %leaf.full_name, "Unit not processable, rendering empty");
            return Ok(None);
        }
        let provider = self.next_provider(leaf);
        let ctx = self.context_for(leaf, params)?;
        let html = self.render_nested(registry, leaf, page, &provider, &ctx)?;
        Ok(Some((provider, html)))
    }

    /// Render a page's template chain without its layout.
    fn render_embedded_page(&self, registry: &Handlebars<'_>, name: &str) -> Result<String, RenderError> {
        let leaf = resolve(self.env.lookup, ComponentKind::Page, name)?;
        if !self.is_processable(leaf) {
            debug!(page = %leaf.full_name, "Embedded page not processable, rendering empty");
            return Ok(String::new());
        }
        let provider = self.next_provider(leaf);
        let ctx = self.context_for(leaf, &Value::Null)?;
        self.render_nested(registry, leaf, &leaf.full_name, &provider, &ctx)
    }

    fn render_nested(
        &self,
        registry: &Handlebars<'_>,
        leaf: &UiComponent,
        page: &str,
        provider: &Provider,
        ctx: &Context,
    ) -> Result<String, RenderError> {
        {
            let mut state = self.state();
            if state.active.contains(&leaf.full_name) {
                let mut chain = state.active.clone();
                chain.push(leaf.full_name.clone());
                return Err(RenderError::Recursive { chain });
            }
            state.active.push(leaf.full_name.clone());
        }
        let result = self.render_chain(registry, leaf, page, provider, ctx);
        self.state().active.pop();
        result
    }

    fn is_processable(&self, leaf: &UiComponent) -> bool {
        !leaf.definition.disabled && is_permitted(self.env.user, &leaf.definition.permissions)
    }

    /// Evaluate the leaf's template and then each ancestor's, nearest first.
    /// Every template runs; the first non-empty trimmed output is returned.
    fn render_chain(
        &self,
        registry: &Handlebars<'_>,
        leaf: &UiComponent,
        page: &str,
        provider: &Provider,
        ctx: &Context,
    ) -> Result<String, RenderError> {
        let lookup = self.env.lookup;
        let mut output: Option<String> = None;

        for (depth, name) in leaf.chain().enumerate() {
            let Some(component) = lookup.component(leaf.kind, name) else {
                continue;
            };
            let Some(path) = &component.template_path else {
                continue;
            };
            let frame = Frame {
                page: page.to_string(),
                instance: provider.clone(),
                in_unit: leaf.kind == ComponentKind::Unit,
                writer: Writer::Component {
                    name: component.full_name.clone(),
                    index: component.index,
                },
                depth,
                open_zones: Vec::new(),
                sub_zone_blocks: 0,
            };
            let rendered = self.render_template(registry, path, frame, ctx)?;
            let trimmed = rendered.trim();
            if output.is_none() && !trimmed.is_empty() {
                output = Some(trimmed.to_string());
            }
        }
        Ok(output.unwrap_or_default())
    }

    fn render_template(
        &self,
        registry: &Handlebars<'_>,
        path: &Path,
        frame: Frame,
        ctx: &Context,
    ) -> Result<String, RenderError> {
        let template = self.template(path)?;
        trace!(template = %path.display(), depth = frame.depth, "Evaluating template");

        self.state().frames.push(frame);
        let mut out = HtmlBuffer::default();
        let mut rc = RenderContext::new(None);
        let result = template.render(registry, ctx, &mut rc, &mut out);
        self.state().frames.pop();

        match result {
            Ok(()) => Ok(out.0),
            Err(source) => Err(self.take_failure().unwrap_or_else(|| RenderError::Render {
                path: path.to_path_buf(),
                source,
            })),
        }
    }

    /// Compiled template, read at most once per pass.
    fn template(&self, path: &Path) -> Result<Arc<Template>, RenderError> {
        if let Some(template) = self.state().templates.get(path) {
            return Ok(Arc::clone(template));
        }
        let source = self.env.source.read_all(path).map_err(|e| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let template = Template::compile(&source).map_err(|e| RenderError::Template {
            path: path.to_path_buf(),
            source: e,
        })?;
        let template = Arc::new(template);
        self.state()
            .templates
            .insert(path.to_path_buf(), Arc::clone(&template));
        Ok(template)
    }

    fn next_provider(&self, leaf: &UiComponent) -> Provider {
        let mut state = self.state();
        state.next_instance += 1;
        Provider {
            instance: state.next_instance,
            name: leaf.full_name.clone(),
            index: leaf.index,
        }
    }

    /// Keep the first helper error and hand Handlebars a message in its place.
    fn fail(&self, err: RenderError) -> handlebars::RenderError {
        let message = err.to_string();
        let mut state = self.state();
        if state.failure.is_none() {
            state.failure = Some(err);
        }
        RenderErrorReason::Other(message).into()
    }

    fn take_failure(&self) -> Option<RenderError> {
        self.state().failure.take()
    }

    /// Run the leaf's script chain and add the template data variables.
    ///
    /// An object returned by the script becomes the root of the template
    /// data; any other value is exposed as `value`. `app`, `uriParams`,
    /// `query`, `user`, `definition` and, for units, `unitParams` are added on
    /// top and win over script keys of the same name.
    fn context_for(&self, leaf: &UiComponent, unit_params: &Value) -> Result<Context, RenderError> {
        let env = self.env;
        let script_env = ScriptEnv {
            app_name: env.app_name,
            request: env.request,
            uri_params: env.uri_params,
            unit_params,
            component: leaf,
            user: env.user,
        };
        let value = env.scripts.run(&script_env).map_err(|source| RenderError::Script {
            component: leaf.full_name.clone(),
            source,
        })?;

        let mut data = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        data.insert(
            "app".to_string(),
            json!({
                "name": env.app_name,
                "displayName": env.config.display_name(env.app_name),
                "publicUri": self.public_uri,
            }),
        );
        data.insert("uriParams".to_string(), string_map(env.uri_params));
        data.insert("query".to_string(), string_map(&env.request.query));
        if let Some(user) = env.user {
            data.insert("user".to_string(), user.to_json());
        }
        data.insert(
            "definition".to_string(),
            Value::Object(leaf.definition.raw().clone()),
        );
        if leaf.kind == ComponentKind::Unit {
            data.insert("unitParams".to_string(), unit_params.clone());
        }
        Ok(Context::from(Value::Object(data)))
    }
}

fn resolve<'l>(lookup: &'l LookupTable, kind: ComponentKind, name: &str) -> Result<&'l UiComponent, RenderError> {
    lookup
        .furthest_child(kind, name)
        .ok_or_else(|| RenderError::UnknownComponent {
            kind,
            name: name.to_string(),
        })
}

fn string_map(map: &IndexMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Flag-style hash parameters: `override=false`, `combine="false"`.
fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s != "false",
        Value::Null => false,
        _ => true,
    }
}

/// Resolve a resource path against the registering fragment's public folder.
pub fn resource_url(public_uri: &str, owner: &str, path: &str) -> String {
    if path.starts_with('/') || path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let path = path.strip_prefix("./").unwrap_or(path);
    format!("{}/{}/{}", public_uri, owner, path)
}

#[derive(Default)]
struct HtmlBuffer(String);

impl Output for HtmlBuffer {
    fn write(&mut self, seg: &str) -> Result<(), std::io::Error> {
        self.0.push_str(seg);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Unit,
    Page,
    Zone,
    DefineZone,
    Resource(ResourceKind),
}

/// One composition helper bound to the pass it renders for.
struct ComposeHelper<'p, 'a> {
    pass: &'p RenderPass<'a>,
    op: Op,
}

impl HelperDef for ComposeHelper<'_, '_> {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let html = match self.op {
            Op::Unit => self.unit(h, r)?,
            Op::Page => self.page(h, r)?,
            Op::Zone => self.zone(h, r, ctx, rc)?,
            Op::DefineZone => self.define_zone(h, r, ctx, rc)?,
            Op::Resource(kind) => self.resource(kind, h)?,
        };
        out.write(&html)?;
        Ok(())
    }
}

type HelperOutput = Result<String, handlebars::RenderError>;

impl ComposeHelper<'_, '_> {
    fn name_param<'h>(&self, h: &'h Helper<'_>) -> Result<&'h str, handlebars::RenderError> {
        h.param(0)
            .and_then(|p| p.value().as_str())
            .ok_or_else(|| self.pass.fail(RenderError::usage(h.name(), "expects a name as its first parameter")))
    }

    fn frame(&self) -> Result<Frame, handlebars::RenderError> {
        let frame = self.pass.state().frames.last().cloned();
        frame.ok_or_else(|| self.pass.fail(RenderError::usage("compose", "helper called outside a fragment template")))
    }

    /// Render a block body with `frame` on top of the stack. Returns the
    /// frame as the body left it.
    fn render_block<'reg: 'rc, 'rc>(
        &self,
        frame: Frame,
        block: Option<&'rc Template>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> Result<(String, Frame), handlebars::RenderError> {
        let Some(block) = block else {
            return Ok((String::new(), frame));
        };
        self.pass.state().frames.push(frame);
        let mut out = HtmlBuffer::default();
        let result = block.render(r, ctx, rc, &mut out);
        let frame = self.pass.state().frames.pop();
        result?;
        let frame = frame.ok_or_else(|| RenderErrorReason::Other("frame stack underflow".to_string()))?;
        Ok((out.0, frame))
    }

    /// Default markup of a `defineZone` block, rendered in the current frame.
    fn render_default<'reg: 'rc, 'rc>(
        &self,
        block: Option<&'rc Template>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> HelperOutput {
        let Some(block) = block else {
            return Ok(String::new());
        };
        let mut out = HtmlBuffer::default();
        block.render(r, ctx, rc, &mut out)?;
        Ok(out.0)
    }

    /// `{{unit "ns.unit.name" key=value}}`
    fn unit(&self, h: &Helper<'_>, r: &Handlebars<'_>) -> HelperOutput {
        let name = self.name_param(h)?;
        let params = Value::Object(
            h.hash()
                .iter()
                .map(|(k, v)| (k.to_string(), v.value().clone()))
                .collect(),
        );
        let page = self.frame()?.page;
        let rendered = self
            .pass
            .render_unit(r, &page, name, &params)
            .map_err(|e| self.pass.fail(e))?;
        Ok(rendered.map(|(_, html)| html).unwrap_or_default())
    }

    /// `{{page "ns.page.name"}}`
    fn page(&self, h: &Helper<'_>, r: &Handlebars<'_>) -> HelperOutput {
        let name = self.name_param(h)?;
        self.pass
            .render_embedded_page(r, name)
            .map_err(|e| self.pass.fail(e))
    }

    /// `{{#zone "name" override=false}}...{{/zone}}`
    fn zone<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> HelperOutput {
        let name = self.name_param(h)?;
        if !h.is_block() {
            return Err(self.pass.fail(RenderError::usage("zone", "must be used as a block")));
        }
        let block = h.template();
        let overrides = h.hash_get("override").is_none_or(|v| flag(v.value()));
        let frame = self.frame()?;

        match frame.open_zones.len() {
            0 => self.write_zone(frame, name, overrides, block, r, ctx, rc),
            1 => self.write_sub_zone(frame, name, overrides, block, r, ctx, rc),
            _ => Err(self.pass.fail(RenderError::ZoneNesting {
                zone: name.to_string(),
                open: frame.open_zones,
            })),
        }
    }

    fn write_zone<'reg: 'rc, 'rc>(
        &self,
        frame: Frame,
        name: &str,
        overrides: bool,
        block: Option<&'rc Template>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> HelperOutput {
        let depth = frame.depth;
        let instance = frame.instance.clone();
        {
            let mut state = self.pass.state();
            let Some(zone) = state.zones.open(name, &frame.page) else {
                debug!(zone = name, page = %frame.page, "Zone belongs to another page, ignoring");
                return Ok(String::new());
            };
            if !zone.entry(&instance).levels.admits(depth) {
                trace!(zone = name, provider = %instance.name, depth, "Overridden by a nearer level");
                return Ok(String::new());
            }
        }

        let mut inner = frame;
        inner.open_zones.push(name.to_string());
        inner.sub_zone_blocks = 0;
        let (html, inner) = self.render_block(inner, block, r, ctx, rc)?;

        let mut state = self.pass.state();
        if let Some(entry) = state
            .zones
            .get_mut(name)
            .and_then(|zone| zone.content_mut(instance.instance))
        {
            // A write that only fills sub-zones leaves the ancestors' markup in place
            let fills_only = html.trim().is_empty() && inner.sub_zone_blocks > 0;
            entry.levels.record(depth, html, overrides && !fills_only);
        }
        Ok(String::new())
    }

    fn write_sub_zone<'reg: 'rc, 'rc>(
        &self,
        frame: Frame,
        name: &str,
        overrides: bool,
        block: Option<&'rc Template>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> HelperOutput {
        let depth = frame.depth;
        let instance = frame.instance.instance;
        let Some(top) = frame.open_zones.first().cloned() else {
            return Ok(String::new());
        };

        {
            let mut state = self.pass.state();
            if let Some(open) = state.frames.last_mut() {
                open.sub_zone_blocks += 1;
            }
            let Some(entry) = state.zones.get(&top).and_then(|zone| zone.content(instance)) else {
                return Ok(String::new());
            };
            if !entry.sub_zone(name).is_none_or(|levels| levels.admits(depth)) {
                trace!(zone = %top, sub_zone = name, depth, "Sub-zone overridden by a nearer level");
                return Ok(String::new());
            }
        }

        let mut inner = frame;
        inner.open_zones.push(name.to_string());
        let (html, _) = self.render_block(inner, block, r, ctx, rc)?;

        let mut state = self.pass.state();
        if let Some(entry) = state
            .zones
            .get_mut(&top)
            .and_then(|zone| zone.content_mut(instance))
        {
            entry.sub_zone_mut(name).record(depth, html, overrides);
        }
        Ok(String::new())
    }

    /// `{{#defineZone "name" scope="protected"}}default{{/defineZone}}`
    fn define_zone<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> HelperOutput {
        let name = self.name_param(h)?;
        let protected = h
            .hash_get("scope")
            .and_then(|v| v.value().as_str())
            .is_some_and(|s| s == "protected");
        let frame = self.frame()?;

        match frame.open_zones.len() {
            0 => self.read_zone(&frame, name, protected, h.template(), r, ctx, rc),
            1 => self.read_sub_zone(&frame, name, h.template(), r, ctx, rc),
            _ => Err(self.pass.fail(RenderError::usage(
                "defineZone",
                format!("'{}' cannot be read inside sub-zone '{}'", name, frame.open_zones.join(" > ")),
            ))),
        }
    }

    fn read_zone<'reg: 'rc, 'rc>(
        &self,
        frame: &Frame,
        name: &str,
        protected: bool,
        block: Option<&'rc Template>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> HelperOutput {
        // Protected reads only apply inside a unit's ancestor templates
        let protected = protected
            && frame.in_unit
            && frame.depth > 0
            && matches!(frame.writer, Writer::Component { .. });
        let instance = frame.instance.instance;

        let html = {
            let mut state = self.pass.state();
            match state.zones.get_mut(name) {
                None => None,
                Some(zone) if protected => zone.take_instance(instance),
                Some(zone) => {
                    let resources = zone.render_resources(&self.pass.public_uri);
                    let html = zone.render_contents();
                    if resources.is_empty() {
                        Some(html)
                    } else {
                        Some(format!("{}\n{}", resources, html))
                    }
                }
            }
        };
        match html {
            Some(html) => Ok(html),
            None => self.render_default(block, r, ctx, rc),
        }
    }

    fn read_sub_zone<'reg: 'rc, 'rc>(
        &self,
        frame: &Frame,
        name: &str,
        block: Option<&'rc Template>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
    ) -> HelperOutput {
        let default = self.render_default(block, r, ctx, rc)?;
        let Some(top) = frame.open_zones.first() else {
            return Ok(default);
        };
        let mut state = self.pass.state();
        match state
            .zones
            .get_mut(top)
            .and_then(|zone| zone.content_mut(frame.instance.instance))
        {
            Some(entry) => {
                entry.add_placeholder(name, default);
                Ok(sub_zone_marker(name))
            }
            None => Ok(default),
        }
    }

    /// `{{css "css/a.css" "css/b.css" combine=false}}`, and likewise `js`/`less`.
    fn resource(&self, kind: ResourceKind, h: &Helper<'_>) -> HelperOutput {
        let helper = h.name();
        let frame = self.frame()?;
        if frame.open_zones.len() != 1 {
            return Err(self.pass.fail(RenderError::ResourceOutsideZone {
                helper: helper.to_string(),
            }));
        }
        if h.params().is_empty() {
            return Err(self.pass.fail(RenderError::usage(helper, "expects at least one path")));
        }
        let combine = h.hash_get("combine").is_none_or(|v| flag(v.value()));
        let (owner, provider_index) = match &frame.writer {
            Writer::Component { name, index } => (name.clone(), *index),
            Writer::Layout => (LAYOUTS_OWNER.to_string(), usize::MAX),
        };

        let mut urls = Vec::with_capacity(h.params().len());
        for param in h.params() {
            let Some(path) = param.value().as_str() else {
                return Err(self.pass.fail(RenderError::usage(helper, "paths must be strings")));
            };
            urls.push(resource_url(&self.pass.public_uri, &owner, path));
        }

        let mut state = self.pass.state();
        let Some(zone) = frame
            .open_zones
            .first()
            .and_then(|top| state.zones.get_mut(top))
        else {
            return Ok(String::new());
        };
        for url in urls {
            let added = zone.add_resource(Resource {
                kind,
                provider: owner.clone(),
                provider_index,
                url: url.clone(),
                combine,
            });
            if !added {
                trace!(url = %url, "Resource already registered in zone");
            }
        }
        Ok(String::new())
    }
}
