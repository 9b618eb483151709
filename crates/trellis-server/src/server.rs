//! Static preview server with single-page-app routing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::services::ServeDir;

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct StaticServerConfig {
    /// Directory to serve
    pub root: PathBuf,

    /// First port to try
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Consecutive ports probed before giving up
    pub port_attempts: u16,

    /// Open browser on start
    pub open: bool,
}

impl Default for StaticServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("aiui"),
            port: 8000,
            host: "127.0.0.1".to_string(),
            port_attempts: 10,
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("No available port found in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Serves a compiled site directory.
pub struct StaticServer {
    config: StaticServerConfig,
}

impl StaticServer {
    pub fn new(config: StaticServerConfig) -> Self {
        Self { config }
    }

    /// Serve until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let port = find_available_port(
            &self.config.host,
            self.config.port,
            self.config.port_attempts,
        )?;
        if port != self.config.port {
            tracing::warn!("Port {} in use, using {}", self.config.port, port);
        }

        let addr: SocketAddr = format!("{}:{}", self.config.host, port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.config.host, port)))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!(
            "Serving {} at http://localhost:{}",
            self.config.root.display(),
            port
        );

        if self.config.open {
            let url = format!("http://localhost:{}", port);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, spa_router(&self.config.root))
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))
    }
}

/// Router serving `root`, answering client-side routes with `index.html`.
pub fn spa_router(root: &Path) -> Router {
    let root = Arc::new(root.to_path_buf());

    Router::new()
        .fallback_service(ServeDir::new(root.as_path()))
        .layer(middleware::from_fn_with_state(root, spa_fallback))
}

async fn spa_fallback(State(root): State<Arc<PathBuf>>, mut request: Request, next: Next) -> Response {
    if serves_index(&root, request.uri().path()) {
        tracing::debug!("Rewriting {} to /index.html", request.uri().path());
        *request.uri_mut() = Uri::from_static("/index.html");
    }
    next.run(request).await
}

/// Whether a request path is a client-side route: its last segment has no
/// extension and it does not name a file under `root`.
pub fn serves_index(root: &Path, path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if last_segment.contains('.') {
        return false;
    }

    !root.join(path.trim_start_matches('/')).is_file()
}

/// First port in `start..start + attempts` that can be bound on `host`.
pub fn find_available_port(host: &str, start: u16, attempts: u16) -> Result<u16, ServerError> {
    (0..attempts)
        .filter_map(|offset| start.checked_add(offset))
        .find(|&port| std::net::TcpListener::bind((host, port)).is_ok())
        .ok_or(ServerError::NoAvailablePort {
            start,
            end: start.saturating_add(attempts),
        })
}
