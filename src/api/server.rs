//! API server setup and configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware::RateLimiter;
use crate::api::routes;
use crate::config::AppConfig;
use crate::credentials::CredentialVerifier;
use crate::error::{Error, Result};
use crate::library::LibraryService;
use crate::steam::SteamApi;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: false,
        }
    }
}

impl ApiServerConfig {
    /// Load server config from environment variables, falling back to
    /// defaults.
    ///
    /// Supported env vars:
    /// - `API_BIND_ADDRESS` (e.g. "0.0.0.0")
    /// - `API_PORT` (e.g. "5000")
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(bind_address) = std::env::var("API_BIND_ADDRESS")
            && !bind_address.trim().is_empty()
        {
            config.bind_address = bind_address;
        }

        if let Ok(port) = std::env::var("API_PORT")
            && let Ok(parsed) = port.parse::<u16>()
        {
            config.port = parsed;
        }

        config
    }
}

/// Shared application state.
///
/// Everything here is request-independent: injected capabilities and the
/// shared outbound connection pool. No per-request data is ever stored.
#[derive(Clone)]
pub struct AppState {
    /// Server start time for uptime calculation
    pub start_time: Instant,
    /// Upstream Steam API capability
    pub steam: Arc<dyn SteamApi>,
    /// Library service orchestrating the pipeline
    pub library: Arc<LibraryService>,
    /// Credential verification capability
    pub credentials: Arc<dyn CredentialVerifier>,
    /// Shared admission counters
    pub rate_limiter: Arc<RateLimiter>,
    /// Static UI directory
    pub static_dir: PathBuf,
    /// Courtesy delay before numeric-id library fetches
    pub id_fetch_delay: Duration,
}

impl AppState {
    pub fn new(
        steam: Arc<dyn SteamApi>,
        credentials: Arc<dyn CredentialVerifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            library: Arc::new(LibraryService::new(steam.clone())),
            steam,
            credentials,
            rate_limiter: Arc::new(RateLimiter::new()),
            static_dir: config.static_dir.clone(),
            id_fetch_delay: Duration::from_millis(config.id_fetch_delay_ms),
        }
    }
}

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
    cancel_token: CancellationToken,
}

impl ApiServer {
    /// Create a server with the given state.
    pub fn with_state(config: ApiServerConfig, state: AppState) -> Self {
        Self {
            config,
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Get the cancellation token for graceful shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Build the router with all middleware and routes.
    fn build_router(&self) -> Router {
        let mut router = routes::create_router(self.state.clone());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Start the server.
    pub async fn run(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| Error::config(format!("Invalid address: {e}")))?;

        let router = self
            .build_router()
            .into_make_service_with_connect_info::<SocketAddr>();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("API server listening on http://{}", addr);

        let cancel_token = self.cancel_token.clone();

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                tracing::info!("API server shutting down...");
            })
            .await
            .map_err(|e| Error::config(format!("Server error: {e}")))?;

        Ok(())
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
