pub mod handlers;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::search::SearchService;
use handlers::{ping, search, search_page};

/// Build the API router
pub fn create_router(service: SearchService, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/ping", get(ping))
        .route("/api/search", get(search))
        .route("/", get(search_page))
        .with_state(service)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Start the API server with graceful shutdown support
pub async fn start_server_with_shutdown(
    router: Router,
    addr: &str,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        shutdown_signal.await;
        info!("Shutdown signal received, stopping server gracefully...");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("API server stopped gracefully");
    Ok(())
}
