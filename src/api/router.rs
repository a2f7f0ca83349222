//! API router configuration.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    active_session, api_info, cancel_session, complete_session, create_session,
    end_hold, end_recovery, get_profile, get_session, health, list_sessions, next_round,
    recent_sessions, register, session_stats, start_hold, start_recovery, update_profile,
    update_session, AppState,
};
use crate::security::auth_middleware;

/// Create the API router with all routes configured.
pub fn create_router() -> Router {
    create_router_with_state(AppState::new())
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    let authenticated = middleware::from_fn_with_state(state.tokens.clone(), auth_middleware);

    // Session routes
    let session_routes = Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/active", get(active_session))
        .route("/recent", get(recent_sessions))
        .route("/stats", get(session_stats))
        .route("/{id}", get(get_session).patch(update_session))
        .route("/{id}/start_hold", post(start_hold))
        .route("/{id}/end_hold", post(end_hold))
        .route("/{id}/start_recovery", post(start_recovery))
        .route("/{id}/end_recovery", post(end_recovery))
        .route("/{id}/next_round", post(next_round))
        .route("/{id}/complete", post(complete_session))
        .route("/{id}/cancel", post(cancel_session))
        .route_layer(authenticated.clone());

    let profile_routes = Router::new()
        .route("/me", get(get_profile).patch(update_profile))
        .route_layer(authenticated);

    // Registration is the only way to obtain a token.
    let auth_routes = Router::new().route("/register", post(register));

    // API v1 routes
    let api_v1 = Router::new()
        .route("/", get(api_info))
        .nest("/auth", auth_routes)
        .nest("/profiles", profile_routes)
        .nest("/sessions", session_routes);

    // Build main router
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Stop accepting connections on Ctrl-C and drain in-flight requests.
    pub graceful_shutdown: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            graceful_shutdown: true,
        }
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 3000)
    }
}

/// Start the API server.
pub async fn serve(config: ServerConfig) -> crate::Result<()> {
    serve_with_state(config, AppState::new()).await
}

/// Start the API server with custom state.
pub async fn serve_with_state(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router_with_state(state);

    tracing::info!("Starting breathwork API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::BreathworkError::Io)?;

    let server = axum::serve(listener, router);
    let result = if config.graceful_shutdown {
        server.with_graceful_shutdown(shutdown_signal()).await
    } else {
        server.await
    };
    result.map_err(|e| crate::error::BreathworkError::Io(std::io::Error::other(e.to_string())))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
