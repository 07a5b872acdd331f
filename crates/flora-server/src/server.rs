use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;

use crate::auth::require_caller;
use crate::handlers::{
    entries::{add_favorite, get_entry, remove_favorite, search_entries},
    health::health_check,
    metrics::metrics_handler,
    user::{get_favorites, get_history, get_profile},
};
use crate::middleware::{LoggingLayer, RequestIdLayer, ResponseCacheLayer};
use crate::state::AppState;

/// Nombre de recurso (y key prefix) de las rutas de entries.
pub const ENTRIES_RESOURCE: &str = "entries";
/// Nombre de recurso (y key prefix) de las rutas de usuario.
pub const USER_RESOURCE: &str = "user";

/// Creates the application router.
///
/// Each resource group is wrapped first by its cache layer and then by the
/// auth middleware, so a request is authenticated before the cache sees it.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    let auth = middleware::from_fn_with_state(state.clone(), require_caller);

    let entries_router = Router::new()
        .route("/entries/en", get(search_entries))
        .route("/entries/en/{word}", get(get_entry))
        .route("/entries/en/{word}/favorite", post(add_favorite))
        .route("/entries/en/{word}/unfavorite", delete(remove_favorite))
        .route_layer(ResponseCacheLayer::new(state.gate(), ENTRIES_RESOURCE))
        .route_layer(auth.clone());

    let user_router = Router::new()
        .route("/user/me", get(get_profile))
        .route("/user/me/history", get(get_history))
        .route("/user/me/favorites", get(get_favorites))
        .route_layer(ResponseCacheLayer::new(state.gate(), USER_RESOURCE))
        .route_layer(auth);

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    let app_router = Router::new()
        .route("/health", get(health_check))
        .merge(entries_router)
        .merge(user_router)
        .with_state(state);

    Router::new()
        .merge(app_router)
        .merge(metrics_router)
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(middleware_stack)
}

/// Runs the server until Ctrl+C or SIGTERM.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(error) => {
                tracing::error!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
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
