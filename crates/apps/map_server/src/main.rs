use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_STATIC_ROOT: &str = "static";
const DEFAULT_DOCUMENTS_ROOT: &str = "documents";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq)]
struct ServerConfig {
    addr: SocketAddr,
    static_root: PathBuf,
    documents_root: PathBuf,
    backend_url: String,
}

impl ServerConfig {
    fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let addr = var("MAP_ADDR", DEFAULT_ADDR);
        let addr = addr
            .parse()
            .map_err(|e| format!("invalid MAP_ADDR {addr:?}: {e}"))?;
        Ok(Self {
            addr,
            static_root: PathBuf::from(var("MAP_STATIC_ROOT", DEFAULT_STATIC_ROOT)),
            documents_root: PathBuf::from(var("MAP_DOCUMENTS_ROOT", DEFAULT_DOCUMENTS_ROOT)),
            backend_url: var("MAP_BACKEND_URL", DEFAULT_BACKEND_URL),
        })
    }
}

#[derive(Clone)]
struct AppState {
    backend_url: String,
    http: reqwest::Client,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env()?;
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| format!("bind {}: {e}", config.addr))?;
    info!(
        "map server listening on http://{} (static {:?}, documents {:?}, backend {})",
        config.addr, config.static_root, config.documents_root, config.backend_url
    );
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {e}"))
}

fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        backend_url: config.backend_url.clone(),
        http: reqwest::Client::new(),
    };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/*rest", get(proxy_api))
        .nest_service("/static", ServeDir::new(&config.static_root))
        .nest_service("/documents", ServeDir::new(&config.documents_root))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

/// Joins the backend base URL with the request path and query.
fn upstream_url(backend: &str, uri: &Uri) -> String {
    let path = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    format!("{}{}", backend.trim_end_matches('/'), path)
}

async fn proxy_api(State(state): State<AppState>, uri: Uri) -> Response {
    let url = upstream_url(&state.backend_url, &uri);
    match state.http.get(&url).send().await {
        Ok(resp) => map_proxy_response(resp).await,
        Err(err) => {
            error!("backend GET {url} failed: {err}");
            (StatusCode::BAD_GATEWAY, "backend unavailable").into_response()
        }
    }
}

async fn map_proxy_response(resp: reqwest::Response) -> Response {
    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = resp
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    match resp.bytes().await {
        Ok(bytes) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(&content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/json")),
            );
            (status, headers, Body::from(bytes)).into_response()
        }
        Err(err) => {
            error!("backend response read failed: {err}");
            (StatusCode::BAD_GATEWAY, "backend unavailable").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn config_defaults_and_overrides() {
        let cfg = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.static_root, PathBuf::from("static"));
        assert_eq!(cfg.backend_url, "http://127.0.0.1:8000");

        let vars: HashMap<&str, &str> = [
            ("MAP_ADDR", "0.0.0.0:9000"),
            ("MAP_DOCUMENTS_ROOT", "/srv/docs"),
        ]
        .into_iter()
        .collect();
        let cfg = ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.addr.port(), 9000);
        assert_eq!(cfg.documents_root, PathBuf::from("/srv/docs"));
    }

    #[test]
    fn bad_addr_is_reported() {
        let err = ServerConfig::from_lookup(|k| (k == "MAP_ADDR").then(|| "nope".to_string()))
            .unwrap_err();
        assert!(err.starts_with("invalid MAP_ADDR"));
    }

    #[test]
    fn upstream_keeps_path_and_query() {
        let uri: Uri = "/api/shapefiles/MG?page=2".parse().unwrap();
        assert_eq!(
            upstream_url("http://backend:8000/", &uri),
            "http://backend:8000/api/shapefiles/MG?page=2"
        );
        let uri: Uri = "/api/suppliers/".parse().unwrap();
        assert_eq!(upstream_url("http://backend:8000", &uri), "http://backend:8000/api/suppliers/");
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await.status(), StatusCode::OK);
    }
}
