/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Server-side page composition for UUF applications.
//!
//! An app is a directory of inheritable fragments:
//!
//! - `pages/{namespace}.{name}/` are routed by URI and rendered into a layout
//! - `units/{namespace}.{name}/` are embedded with `{{unit "..."}}` or pushed
//!   onto pages by URI pattern
//! - `layouts/{name}.hbs` read the zones pages and units wrote
//!
//! Loading builds a [`LookupTable`]: every component is resolved against its
//! `extends` chain, its definition merged, the whole set ordered and validated.
//! Rendering runs one [`RenderPass`] per request. Templates are Handlebars;
//! the pass registers its own helpers, in which `zone` blocks write content
//! and `defineZone` reads it back, with nearer fragments able to override what
//! their ancestors wrote.
//!
//! [`App`] ties these together: it caches the lookup table per generation of
//! `app.json` and turns a [`RequestInfo`] into an [`Outcome`].

pub mod app;
pub mod component;
pub mod compose;
pub mod config;
pub mod definition;
pub mod error;
pub mod identity;
pub mod lookup;
pub mod request;
pub mod router;
pub mod script;
pub mod source;
pub mod uri;
pub mod zone;

pub use app::{App, AppSnapshot, Outcome};
pub use component::{ComponentKind, UiComponent};
pub use compose::{RenderEnv, RenderPass};
pub use config::{AppConfig, AuthConfig};
pub use definition::Definition;
pub use error::{AppError, LoadError, RenderError, Result, ScriptError};
pub use identity::{IdentityProvider, SessionStore, User};
pub use lookup::LookupTable;
pub use request::RequestInfo;
pub use router::{RouteMatch, Routes};
pub use script::{ScriptEnv, ScriptRegistry, SuperChain};
pub use source::{FileSource, FsSource, MemorySource};
pub use uri::UriPattern;
