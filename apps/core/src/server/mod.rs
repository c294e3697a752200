//! HTTP surface: the intake form and a small JSON API over the router.

mod page;
pub mod routes;

use crate::actors::traits::{DocumentClassifier, LlmActor};
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::router::AgentRouter;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Builds the application with every route and middleware layer.
pub fn build_app<L, C>(router: Arc<AgentRouter<L, C>>, max_upload_size: usize) -> Router
where
    L: LlmActor,
    C: DocumentClassifier,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/route",
            post(routes::route_upload::<L, C>).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/route/text", post(routes::route_text::<L, C>))
        .route("/stats", get(routes::router_stats::<L, C>))
        .route("/stats/all", get(routes::memory_stats::<L, C>))
        .route("/logs", get(routes::recent_logs::<L, C>));

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .nest("/api", api)
        .with_state(router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve<L, C>(router: Arc<AgentRouter<L, C>>, config: &ServerConfig) -> Result<(), AppError>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))?;

    let app = build_app(router, config.max_upload_size);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Intake server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
