//! Web server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::auth::TokenAuthority;
use crate::config::Config;
use crate::file::{FileCatalog, PathResolver};
use crate::{FileAccessError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// HTTP server for the file service.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Favicon location.
    favicon: PathBuf,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(addr: SocketAddr, app_state: Arc<AppState>, favicon: impl Into<PathBuf>) -> Self {
        Self {
            addr,
            app_state,
            favicon: favicon.into(),
        }
    }

    /// Build a web server from configuration and initialized tokens.
    ///
    /// Creates the storage root if it does not exist yet.
    pub fn from_config(config: &Config, tokens: Arc<TokenAuthority>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| FileAccessError::Config(format!("invalid server address: {e}")))?;

        let resolver = PathResolver::new(&config.storage.root)?;
        tracing::info!("Serving files from: {}", resolver.root().display());

        let catalog = FileCatalog::new(resolver, config.storage.max_upload_bytes());
        let app_state = Arc::new(AppState::new(catalog, tokens));

        Ok(Self::new(addr, app_state, &config.static_files.favicon))
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn into_router(self) -> Router {
        create_router(self.app_state, &self.favicon).layer(CompressionLayer::new())
    }

    /// Run the web server until Ctrl-C.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.addr;
        let router = self.into_router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let addr = self.addr;
        let router = self.into_router();

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
