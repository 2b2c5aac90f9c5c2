//! Web server implementation
//!
//! Provides the main server struct and configuration.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

use super::routes::{api_routes, AppState};
use super::{DEFAULT_BIND, DEFAULT_PORT, DEFAULT_UPLOAD_LIMIT};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Address to bind to
    pub bind: String,
    /// Number of runtime worker threads
    pub workers: usize,
    /// Maximum upload size in bytes
    pub upload_limit: usize,
    /// Directory for temporary upload copies
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            workers: num_cpus::get(),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
            upload_dir: std::env::temp_dir().join("cover-validator-uploads"),
        }
    }
}

impl ServerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

/// Web server instance
pub struct WebServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl WebServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        Router::new()
            .nest("/api", api_routes())
            .layer(CorsLayer::permissive())
            // The tower-http limit replaces axum's built-in 2 MB cap
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.config.upload_limit))
            .with_state(self.state.clone())
    }

    /// Run the server until SIGINT or SIGTERM
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.config.socket_addr()?;
        std::fs::create_dir_all(&self.config.upload_dir)?;
        let router = self.build_router();

        info!(%addr, upload_dir = %self.config.upload_dir.display(), "starting server");
        info!("POST /api/validate  - Upload and check a cover");
        info!("GET  /api/health    - Health check");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(wait_for_shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

/// Returns when SIGTERM or SIGINT is received
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::{AnalysisOptions, CoverAnalyzer, TesseractDetector, TextDetector};
    use crate::input::CoverLoader;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state(upload_dir: PathBuf) -> AppState {
        let detector: Box<dyn TextDetector> = Box::new(TesseractDetector::default());
        AppState::new(
            CoverAnalyzer::new(AnalysisOptions::default(), detector),
            CoverLoader::new(300),
            upload_dir,
        )
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.upload_limit, 50 * 1024 * 1024);
        assert!(config.workers > 0);
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::default()
            .with_port(3000)
            .with_bind("0.0.0.0")
            .with_upload_limit(10 * 1024 * 1024)
            .with_upload_dir("/tmp/covers")
            .with_workers(0);

        assert_eq!(config.port, 3000);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.upload_limit, 10 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/covers"));
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_server_config_socket_addr() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = ServerConfig::default().with_bind("not an address");
        assert!(config.socket_addr().is_err());
    }

    #[tokio::test]
    async fn test_router_nests_api() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::default().with_upload_dir(temp_dir.path());
        let server = WebServer::new(config, state(temp_dir.path().to_path_buf()));

        let response = server
            .build_router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_over_limit_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::default()
            .with_upload_dir(temp_dir.path())
            .with_upload_limit(16);
        let server = WebServer::new(config, state(temp_dir.path().to_path_buf()));

        let response = server
            .build_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/validate")
                    .header("content-type", "multipart/form-data; boundary=x")
                    .header("content-length", "1024")
                    .body(Body::from(vec![b'a'; 1024]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
