//! HTTP handlers grouped by resource.

pub(crate) mod checkins;
pub(crate) mod profile;

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    provider_configured: bool,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider_configured: state.service.provider_configured(),
    })
}

pub(crate) async fn not_found() -> ApiError {
    ApiError::NotFound
}
