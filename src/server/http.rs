//! HTTP server implementation.
//!
//! hyper http1 with TokioIo and a hand-rolled method/path router; handlers
//! live in `crate::routes` and return plain `Response<Full<Bytes>>` values.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::Args;
use crate::ddragon::DataDragonApi;
use crate::model::EntityKind;
use crate::routes;
use crate::store::GameStore;
use crate::sync::{StatusReporter, SyncEngine};

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

pub type SharedStore = Arc<dyn GameStore>;
pub type SharedEngine = Arc<SyncEngine<dyn DataDragonApi, dyn GameStore>>;
pub type SharedReporter = StatusReporter<dyn DataDragonApi, dyn GameStore>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub engine: SharedEngine,
    pub store: SharedStore,
    pub reporter: SharedReporter,
    /// "mongodb" or "memory", for the health endpoint
    pub store_backend: &'static str,
}

impl AppState {
    pub fn new(
        args: Args,
        engine: SharedEngine,
        store: SharedStore,
        reporter: SharedReporter,
        store_backend: &'static str,
    ) -> Self {
        Self {
            args,
            engine,
            store,
            reporter,
            store_backend,
        }
    }
}

/// Run the HTTP server until the process exits
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;
    info!("HTTP server listening on {}", state.args.listen);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    debug!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(&state)
        }

        // Readiness probe - requires a reachable store
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(&state).await
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        // ====================================================================
        // Sync engine
        // ====================================================================
        (Method::GET, "/sync/status") => routes::sync_status(&state).await,

        (Method::POST, "/sync/all") => {
            let body = read_body(req).await?;
            routes::sync_all(&state, &body).await
        }

        (Method::POST, p) if p.starts_with("/sync/") => {
            let kind = p.trim_start_matches("/sync/");
            match kind.parse::<EntityKind>() {
                Ok(kind) => {
                    let body = read_body(req).await?;
                    routes::sync_kind(&state, kind, &body).await
                }
                Err(_) => bad_request_response(&format!("unknown entity kind '{kind}'")),
            }
        }

        // ====================================================================
        // Read-only projections
        // ====================================================================
        (Method::GET, "/champions") => routes::list_champions(&state).await,

        (Method::GET, p) if p.starts_with("/champions/") => {
            let id = p.trim_start_matches("/champions/");
            routes::champion_detail(&state, id).await
        }

        (Method::GET, "/items") => routes::list_items(&state, query.as_deref()).await,

        (Method::GET, p) if p.starts_with("/items/") && p.ends_with("/recipe") => {
            let id = p
                .trim_start_matches("/items/")
                .trim_end_matches("/recipe")
                .trim_end_matches('/');
            routes::item_recipe(&state, id, query.as_deref()).await
        }

        (Method::GET, p) if p.starts_with("/items/") => {
            let id = p.trim_start_matches("/items/");
            routes::item_detail(&state, id).await
        }

        (Method::GET, "/runes") => routes::rune_tree(&state).await,

        (Method::GET, "/runes/search") => {
            routes::search_runes(&state, query.as_deref()).await
        }

        (Method::GET, p) if p.starts_with("/runes/paths/") => {
            let id = p.trim_start_matches("/runes/paths/");
            routes::rune_path_detail(&state, id).await
        }

        (_, p) => not_found_response(p),
    };

    Ok(to_boxed(response))
}

/// Collect a request body into bytes
async fn read_body(req: Request<Incoming>) -> Result<Bytes, hyper::Error> {
    Ok(req.into_body().collect().await?.to_bytes())
}

fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Bad request response
pub fn bad_request_response(message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Bad Request",
        "message": message,
    });

    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// JSON response with an arbitrary status code
pub fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_string(value)
        .unwrap_or_else(|_| r#"{"error":"Serialization failed"}"#.to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
