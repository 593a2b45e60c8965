//! # Analysis Job Server
//!
//! Exposes the analytics core over HTTP as asynchronous jobs: `POST /analyze`
//! returns a task id at once, `GET /task/:task_id` reports progress. Every
//! task route requires the `x-api-key` header.

use analytics::AnalyticsEngine;
use axum::{
    Router,
    routing::{get, post},
};
use configuration::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod jobs;

pub use dispatcher::Dispatcher;
pub use jobs::JobStore;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub api_key: String,
}

/// Defines the application routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/analyze", post(handlers::start_analysis))
        .route("/task/:task_id", get(handlers::get_task_status))
        .route("/task/:task_id/report", get(handlers::get_task_report))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Builds the dispatcher from configuration and serves until shut down.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    configuration::validate_server(config)?;

    let addr: SocketAddr = config.server.addr.parse()?;
    let source = data_source::from_settings(&config.source)?;
    let engine = AnalyticsEngine::new(config.analysis.initial_equity)?;
    let dispatcher = Dispatcher::new(
        JobStore::new(),
        source,
        engine,
        config.analysis.lookback_days,
    );

    let state = Arc::new(AppState {
        dispatcher,
        api_key: config.server.api_key.clone(),
    });
    let app = router(state);

    tracing::info!("Web server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
