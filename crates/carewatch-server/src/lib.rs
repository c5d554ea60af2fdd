//! JSON HTTP API for Carewatch.
//!
//! Every response uses a `{"success": bool, ...}` envelope, except the
//! health probe.

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use axum::routing::get;
use carewatch_core::CheckinService;
use log::info;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the API router around a check-in service.
pub fn build_router(service: Arc<CheckinService>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/api/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route(
            "/api/checkins",
            get(routes::checkins::list_checkins).post(routes::checkins::create_checkin),
        )
        .route("/api/checkins/{id}", get(routes::checkins::get_checkin))
        .fallback(routes::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(AppState::new(service))
}

/// Serve the API on `addr` until `shutdown` resolves.
pub async fn serve(
    service: Arc<CheckinService>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("carewatch api listening (addr={})", listener.local_addr()?);
    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
