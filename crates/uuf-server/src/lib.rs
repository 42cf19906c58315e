//! uuf-server: HTTP host for UUF applications
//!
//! This crate provides:
//! - Discovery of app directories under a common root
//! - An axum router that dispatches `/{app}/...` requests to the matching app
//! - The `uuf-server` binary

pub mod context;
pub mod discovery;
pub mod error;
pub mod server;

pub use context::{ServerConfig, ServerContext, SharedContext};
pub use error::{Error, Result};
