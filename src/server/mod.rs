use crate::config::{Config, CorsConfig};
use crate::streaming::{self, AssetByteServer, AssetStore, FsAssetStore};
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

mod error;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub assets: Arc<AssetByteServer>,
}

impl AppContext {
    /// Context serving assets from `store`.
    pub fn new(config: Config, store: Arc<dyn AssetStore>) -> Self {
        let assets = AssetByteServer::new(store, config.storage.chunk_size);
        Self {
            config: Arc::new(config),
            assets: Arc::new(assets),
        }
    }

    /// Context serving files from the configured assets directory.
    pub fn from_config(config: Config) -> Self {
        let store = FsAssetStore::new(config.storage.assets_dir.clone());
        Self::new(config, Arc::new(store))
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .nest("/assets", streaming::assets_router());

    if let Some(cors) = cors_layer(&ctx.config.server.cors) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http()).with_state(ctx)
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let wildcard = config.allowed_origins.iter().any(|o| o == "*");
    let origin = if config.allowed_origins.is_empty() || wildcard {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::HEAD])
            .allow_headers([header::RANGE])
            .expose_headers([
                header::CONTENT_RANGE,
                header::ACCEPT_RANGES,
                header::CONTENT_LENGTH,
            ]),
    )
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    tracing::info!("Serving assets from {:?}", config.storage.assets_dir);
    let app = create_router(AppContext::from_config(config));

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
