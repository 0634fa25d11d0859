mod auth;
mod cors;
mod health;
mod request_context;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use switchboard_config::Config;
use switchboard_llm::Gateway;
use tower_http::trace::TraceLayer;

use crate::auth::AuthState;
use crate::health::ServiceInfo;

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
    /// Returns an error if the backend transport cannot be initialized
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let gateway = Gateway::from_config(config)?;
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build the server around an existing gateway
    pub fn with_gateway(config: &Config, gateway: Gateway) -> Self {
        let health = &config.server.health;
        let health_path = health.enabled.then(|| health.path.clone());

        let info = Arc::new(ServiceInfo::new(
            config.backend.base_url.to_string(),
            gateway.policy().front_models().map(ToOwned::to_owned).collect(),
            health_path.clone(),
        ));

        let mut app = Router::new().route(
            "/",
            axum::routing::get(health::index_handler).with_state(Arc::clone(&info)),
        );

        // Health check
        if let Some(ref path) = health_path {
            app = app.route(
                path,
                axum::routing::get(health::health_handler).with_state(Arc::clone(&info)),
            );
        }

        app = app.route(
            "/v1/status",
            axum::routing::get(health::status_handler).with_state(info),
        );

        app = app.merge(switchboard_llm::llm_router(gateway));

        // Apply middleware layers (innermost first)

        // Bearer key authentication
        if let Some(ref auth_config) = config.server.auth
            && auth_config.enabled
        {
            let state = AuthState::new(
                auth_config,
                config.backend.api_key.as_ref(),
                config.server.compat.as_ref(),
                health_path.as_deref(),
            );
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let state = state.clone();
                async move { auth::auth_middleware(state, req, next).await }
            }));
        }

        // Request context (outside auth so rejections are logged with a request id)
        app = app.layer(axum::middleware::from_fn(request_context::request_context_middleware));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS (outermost, so preflight requests never reach auth)
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Self {
            router: app,
            listen_address: config.server.listen_address(),
        }
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
    /// Blocks until the cancellation token is triggered. In-flight streams
    /// are allowed to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

        Ok(())
    }
}
