//! In-process HTTP tests against the router.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::Router;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tower::ServiceExt;
use uuf_server::server::build_router;
use uuf_server::{Error, ServerConfig, ServerContext};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// One app, `shop`, with a public page, a guarded page and a broken page.
fn apps_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    let app = temp.path().join("shop");
    write(&app, "app.json", r#"{ "displayName": "Shop", "loginUri": "/shop/login" }"#);
    write(&app, "layouts/main.hbs", "<body>{{#defineZone \"content\"}}empty{{/defineZone}}</body>");

    write(&app, "pages/shop.home/home.json", r#"{ "version": "1.0.0", "uri": "/", "layout": "main" }"#);
    write(&app, "pages/shop.home/home.hbs", "{{#zone \"content\"}}{{app.displayName}} {{query.q}}{{/zone}}");

    write(
        &app,
        "pages/shop.admin/admin.json",
        r#"{ "version": "1.0.0", "uri": "/admin", "layout": "main", "permissions": ["admin"] }"#,
    );
    write(&app, "pages/shop.admin/admin.hbs", "");

    write(&app, "pages/shop.broken/broken.json", r#"{ "version": "1.0.0", "uri": "/broken", "layout": "main" }"#);
    write(&app, "pages/shop.broken/broken.hbs", "{{#zone \"content\"}}{{unit \"shop.nothing\"}}{{/zone}}");
    temp
}

fn router(temp: &TempDir) -> Router {
    let config = ServerConfig {
        apps_dir: temp.path().to_path_buf(),
        ..ServerConfig::default()
    };
    build_router(Arc::new(ServerContext::load(&config).unwrap()))
}

async fn get(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_lists_apps() {
    let temp = apps_dir();
    let (status, _, body) = get(router(&temp), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["apps"], serde_json::json!(["shop"]));
}

#[tokio::test]
async fn test_renders_page_with_query() {
    let temp = apps_dir();
    let (status, headers, body) = get(router(&temp), "/shop/?q=shoes").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert_eq!(body, "<body>Shop shoes</body>");
}

#[tokio::test]
async fn test_unknown_paths_are_404() {
    let temp = apps_dir();
    let (status, _, _) = get(router(&temp), "/shop/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = get(router(&temp), "/other/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guarded_page_redirects() {
    let temp = apps_dir();
    let (status, headers, _) = get(router(&temp), "/shop/admin").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/shop/login");
}

#[tokio::test]
async fn test_render_error_is_500() {
    let temp = apps_dir();
    let (status, _, body) = get(router(&temp), "/shop/broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("shop.nothing"), "{}", body);
}

#[test]
fn test_load_requires_apps() {
    let temp = TempDir::new().unwrap();
    let config = ServerConfig {
        apps_dir: temp.path().to_path_buf(),
        ..ServerConfig::default()
    };
    assert!(matches!(ServerContext::load(&config), Err(Error::NoApps(_))));

    let config = ServerConfig {
        apps_dir: temp.path().join("missing"),
        ..ServerConfig::default()
    };
    assert!(matches!(ServerContext::load(&config), Err(Error::AppsDirNotFound(_))));
}
