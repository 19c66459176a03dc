use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::post;
use titlecat_ai::Pipeline;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::routes;

/// Build the router around a loaded pipeline.
///
/// Fails only when the configured origin is not a valid header value.
pub fn build_router(pipeline: Arc<Pipeline>, config: &ServerConfig) -> ServerResult<Router> {
    let origin = HeaderValue::from_str(&config.allowed_origin).map_err(|e| {
        ServerError::Config(format!(
            "invalid allowed origin {:?}: {e}",
            config.allowed_origin
        ))
    })?;

    // Credentials rule out wildcards, so methods and headers are listed.
    // Other origins get no allow-origin header at all.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |requested: &HeaderValue, _: &Parts| *requested == origin,
        ))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/predict", post(routes::predict))
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.timeout(),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline))
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(pipeline: Arc<Pipeline>, config: ServerConfig) -> ServerResult<()> {
    let labels = pipeline.labels().len();
    let dim = pipeline.dim();
    let app = build_router(pipeline, &config)?;

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %config.bind,
        origin = %config.allowed_origin,
        timeout_secs = config.timeout_secs,
        dim,
        labels,
        "titlecat listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
