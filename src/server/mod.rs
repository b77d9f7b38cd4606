//! Development server
//!
//! Pages are rendered per request from the already loaded content tree.
//! Nothing is written to disk; the tree, hooks and layout are shared
//! read-only between requests.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{extension_of, split_path, NodeId, UrlMode};
use crate::error::{error_chain, Error};
use crate::helpers::{decode_path, is_local};
use crate::hooks::BEFORE_SERVE;
use crate::render::Rendered;
use crate::Site;

/// Build the router serving `site`
pub fn router(site: Arc<Site>) -> Router {
    Router::new()
        .fallback(fallback_handler)
        .with_state(site)
        .layer(TraceLayer::new_for_http())
}

/// Serve the site until the process is stopped
pub async fn start(site: Site, hostname: &str, port: u16) -> Result<()> {
    for handler in site.hooks.get(BEFORE_SERVE) {
        handler(&site).map_err(|e| Error::hook("before_serve", e))?;
    }

    let server = &site.config.server;
    if !server.certificate.is_empty() || !server.private_key.is_empty() {
        tracing::warn!("TLS certificate and key are configured but not used; serving plain HTTP");
    }

    // Parse address - handle "localhost" specially
    let bind_ip = if hostname == "localhost" {
        "127.0.0.1"
    } else {
        hostname
    };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", hostname, port, server.base_url);
    let app = router(Arc::new(site));

    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Where a request path leads
#[derive(Debug, PartialEq, Eq)]
enum Route {
    /// A file under the static root, with the static prefix removed
    Static(String),
    Redirect(String),
    Node(NodeId),
    NotFound,
}

fn route(site: &Site, path: &str) -> Route {
    let server = &site.config.server;

    if is_local(&server.static_url) {
        let prefix = server.static_url.trim_end_matches('/');
        if let Some(rest) = path.strip_prefix(prefix).filter(|rest| rest.starts_with('/')) {
            return Route::Static(rest.to_string());
        }
    }

    if path == "/" && server.base_url != "/" {
        return Route::Redirect(server.base_url.clone());
    }

    let base = server.base_url.trim_end_matches('/');
    let rest = match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return Route::NotFound,
    };

    let decoded = decode_path(rest);
    match site.tree.walk(&split_path(&decoded)) {
        Some(id) => Route::Node(id),
        None => Route::NotFound,
    }
}

async fn fallback_handler(State(site): State<Arc<Site>>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();

    match route(&site, &path) {
        Route::Static(rest) => serve_static(&site, &rest, request).await,
        Route::Redirect(to) => Redirect::temporary(&to).into_response(),
        Route::NotFound => not_found(&path),
        Route::Node(id) => render_node(site, id).await,
    }
}

async fn serve_static(site: &Site, rest: &str, request: Request<Body>) -> Response {
    let uri = match rest.parse::<Uri>() {
        Ok(uri) => uri,
        Err(_) => return not_found(rest),
    };
    let (mut parts, body) = request.into_parts();
    parts.uri = uri;

    let mut service = ServeDir::new(site.static_root());
    match service.try_call(Request::from_parts(parts, body)).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

async fn render_node(site: Arc<Site>, id: NodeId) -> Response {
    let name = site.tree.get(id).name().to_string();
    let rendered = tokio::task::spawn_blocking(move || site.render(id, UrlMode::Serve)).await;

    match rendered {
        Ok(Ok(Rendered::Page(html))) => Html(html).into_response(),
        Ok(Ok(Rendered::Raw(bytes))) => {
            ([(header::CONTENT_TYPE, content_type(&name))], bytes).into_response()
        }
        Ok(Err(e)) => {
            let message = error_chain(&e);
            tracing::error!("Failed to render {}: {}", name, message);
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
        Err(e) => {
            tracing::error!("Render task for {} failed: {}", name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn not_found(path: &str) -> Response {
    tracing::debug!("Not found: {}", path);
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Content type of a raw file, by extension
fn content_type(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",
        Some("wat") | Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_config, write_files, SAMPLE_FILES};
    use tower::ServiceExt;

    fn serve_site(base_url: &str) -> (tempfile::TempDir, Arc<Site>) {
        let dir = tempfile::tempdir().unwrap();
        write_files(&dir.path().join("docs"), SAMPLE_FILES);
        write_files(
            dir.path(),
            &[
                ("docs/app.js", "console.log('{{ project.name }}');"),
                ("static/css/docsite.css", "body {}"),
            ],
        );

        let mut config = sample_config();
        config.server.base_url = base_url.to_string();
        let site = Site::new(dir.path(), config).unwrap();
        (dir, Arc::new(site))
    }

    async fn get(site: &Arc<Site>, uri: &str) -> (StatusCode, String, String) {
        let response = router(site.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = location.unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
        (status, content_type, body)
    }

    #[test]
    fn test_route_resolution() {
        let (_dir, site) = serve_site("/docs/");
        let setup = site.tree.resolve("guide/setup.md").unwrap();

        assert_eq!(route(&site, "/docs/guide/setup.md"), Route::Node(setup));
        assert_eq!(route(&site, "/docs"), Route::Node(site.tree.root()));
        assert_eq!(route(&site, "/"), Route::Redirect("/docs/".to_string()));
        assert_eq!(route(&site, "/other/guide"), Route::NotFound);
        assert_eq!(route(&site, "/docsguide"), Route::NotFound);
        assert_eq!(
            route(&site, "/static/css/docsite.css"),
            Route::Static("/css/docsite.css".to_string())
        );
    }

    #[tokio::test]
    async fn test_serves_rendered_page() {
        let (_dir, site) = serve_site("/");
        let (status, content_type, body) = get(&site, "/guide/setup.md").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains(r#"<h1 id="setup">Setup</h1>"#));
        assert!(body.contains(r#"href="/notes.txt""#));
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let (dir, _site) = serve_site("/");
        write_files(&dir.path().join("docs"), &[("read me.md", "# Spaced")]);
        let site = Arc::new(Site::new(dir.path(), sample_config()).unwrap());

        let (status, _, body) = get(&site, "/read%20me.md").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Spaced"));
    }

    #[tokio::test]
    async fn test_missing_page_is_404() {
        let (_dir, site) = serve_site("/");
        let (status, _, _) = get(&site, "/guide/nope.md").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_base_url_handling() {
        let (_dir, site) = serve_site("/docs/");
        let (status, _, location) = get(&site, "/").await;
        assert!(status.is_redirection());
        assert_eq!(location, "/docs/");

        let (status, _, _) = get(&site, "/guide/setup.md").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = get(&site, "/docs/guide/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<h1 id="guide">Guide</h1>"#));
    }

    #[tokio::test]
    async fn test_raw_and_static_files() {
        let (_dir, site) = serve_site("/");
        let (status, content_type, body) = get(&site, "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/javascript"));
        assert_eq!(body, "console.log('Sample');");

        let (status, content_type, body) = get(&site, "/static/css/docsite.css").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/css"));
        assert_eq!(body, "body {}");
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("logo.PNG"), "image/png");
        assert_eq!(content_type("blob"), "application/octet-stream");
    }
}
