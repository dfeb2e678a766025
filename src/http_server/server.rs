//! # HTTP Server
//!
//! Wires logging, the gear store and the REST router into a running
//! Axum server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::GearConfig;
use super::errors::{BootError, BootResult};
use crate::rest_api::GearService;
use crate::store::{GearStore, MongoGearStore};

/// HTTP server for the gear catalog
pub struct GearServer {
    config: GearConfig,
    router: Router,
}

impl GearServer {
    /// Create a server over an already-connected store
    pub fn with_store(config: GearConfig, store: Arc<dyn GearStore>) -> Self {
        let router = Self::build_router(GearService::new(store));
        Self { config, router }
    }

    /// Connect to MongoDB and create the server
    pub async fn connect(config: GearConfig) -> BootResult<Self> {
        let store = MongoGearStore::connect(&config.mongo_settings()).await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Gear routes behind permissive CORS and request tracing
    pub fn build_router(service: GearService) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        service
            .router()
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> BootResult<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|_| BootError::InvalidAddress(self.config.socket_addr()))?;

        info!(%addr, "gear catalog listening");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Install the global tracing subscriber
///
/// An unparsable directive falls back to `info`.
pub fn init_tracing(log_level: &str) {
    let (filter, rejected) = match EnvFilter::try_new(log_level) {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new("info"), true),
    };

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        return;
    }

    if rejected {
        warn!(log_level, "invalid log level, falling back to info");
    }
}

/// Bootstrap: tracing, store connection, serve until shutdown
pub async fn run(config: GearConfig) -> BootResult<()> {
    init_tracing(&config.log_level);
    info!("INITIALIZING GEAR CRUD");

    let server = GearServer::connect(config).await?;
    server.start().await
}
