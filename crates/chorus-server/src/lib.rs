mod auth;
mod cors;
mod dashboard;
mod health;
mod history;
mod rate_limit;
mod session;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chorus_catalog::VoiceCatalog;
use chorus_config::Config;
use chorus_keystore::KeyStore;
use chorus_tts::Forwarder;
use tower_http::trace::TraceLayer;

pub use history::{TtsHistory, TtsHistoryEntry};

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if rate-limiter construction fails
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let timeout = Duration::from_secs(config.upstream.timeout_secs);

        // One consistency unit per concern: the key store owns the key
        // file, the catalog owns the voice cache, the history ring is
        // process-lifetime only
        let keys = Arc::new(KeyStore::new(config.storage.key_file()));
        let catalog = Arc::new(VoiceCatalog::new(
            config.upstream.endpoint.clone(),
            config.upstream.api_key.clone(),
            config.storage.voice_cache_file(),
            Duration::from_secs(config.catalog.max_age_secs),
            timeout,
        ));
        let forwarder = Arc::new(Forwarder::new(
            Arc::clone(&keys),
            Arc::clone(&catalog),
            config.upstream.endpoint,
            config.upstream.api_key,
            timeout,
        ));
        let history = Arc::new(TtsHistory::new());

        let service = health::ServiceInfo {
            name: config.service.name,
            version: config.service.version,
        };

        // Public API routes behind custom-key auth
        let tts_state = chorus_tts::TtsState {
            forwarder: Arc::clone(&forwarder),
            keys: Arc::clone(&keys),
        };
        let mut protected = Router::new()
            .merge(chorus_tts::endpoint_router().with_state(tts_state))
            .merge(chorus_catalog::endpoint_router().with_state(Arc::clone(&catalog)));

        let auth_keys = Arc::clone(&keys);
        protected = protected.layer(axum::middleware::from_fn(move |request, next| {
            let keys = Arc::clone(&auth_keys);
            async move { auth::auth_middleware(keys, request, next).await }
        }));

        // Per-IP rate limiting wraps the public surface only; the
        // dashboard is session-gated and not limited
        if let Some(ref rate_limit_config) = config.server.rate_limit {
            let limiter = Arc::new(rate_limit::RequestLimiter::new(rate_limit_config)?);
            protected = protected.layer(axum::middleware::from_fn(move |request, next| {
                let limiter = Arc::clone(&limiter);
                async move { rate_limit::rate_limit_middleware(limiter, request, next).await }
            }));
        }

        let mut app = Router::new();

        if config.server.health.enabled {
            let health_routes = Router::new()
                .route(&config.server.health.path, axum::routing::get(health::health_handler))
                .route("/v1/health", axum::routing::get(health::health_handler))
                .with_state(service);
            app = app.merge(health_routes);
        }

        app = app.merge(protected);

        app = app.merge(dashboard::dashboard_router(dashboard::DashboardState {
            keys,
            catalog,
            forwarder,
            history,
            master_key: config.dashboard.master_key,
            session_token: config.dashboard.session_token,
        }));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
