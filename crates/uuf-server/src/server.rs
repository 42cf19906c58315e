//! HTTP server setup and routing

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use uuf_core::{Outcome, RequestInfo};

use crate::context::{ServerConfig, ServerContext, SharedContext};
use crate::error::Result;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    apps: Vec<String>,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check endpoint
async fn health(State(ctx): State<SharedContext>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        apps: ctx.app_names(),
    })
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Render `/{app}/...` through the matching app.
///
/// Rendering reads templates with blocking I/O, so it runs on the blocking
/// thread pool.
async fn render_page(
    State(ctx): State<SharedContext>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<IndexMap<String, String>>,
) -> Response {
    let path = uri.path().to_string();
    let app_name = path.trim_start_matches('/').split('/').next().unwrap_or_default();
    let Some(app) = ctx.app(app_name) else {
        debug!(%path, "No app for request");
        return not_found();
    };

    let mut request = RequestInfo::get(path.clone());
    request.method = method.to_string();
    request.query = query;
    for (name, value) in &headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    let outcome = tokio::task::spawn_blocking(move || app.handle(&request)).await;
    match outcome {
        Ok(Ok(Outcome::Html(html))) => Html(html).into_response(),
        Ok(Ok(Outcome::NotFound)) => not_found(),
        Ok(Ok(Outcome::Redirect(location))) => {
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        Ok(Ok(Outcome::Forbidden)) => error_response(StatusCode::FORBIDDEN, "Forbidden"),
        Ok(Err(e)) => {
            error!(%path, error = %e, "Failed to render page");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!(%path, error = %e, "Render task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Build the router: `/health` plus every app under its own path prefix.
pub fn build_router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(render_page)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Run the server.
///
/// This function blocks until the server is shut down.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let ctx = Arc::new(ServerContext::load(&config)?);

    let router = build_router(ctx);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "UUF server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| crate::error::Error::Server(e.to_string()))?;

    Ok(())
}
