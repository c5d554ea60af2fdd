use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use carewatch_core::validation::parse_subject;
use carewatch_protocol::{CheckinInput, Observation, ObservationId};
use log::error;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    limit: Option<String>,
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct CheckinsResponse {
    success: bool,
    checkins: Vec<Observation>,
}

#[derive(Serialize)]
pub(crate) struct CheckinResponse {
    success: bool,
    checkin: Observation,
}

/// Unparseable limits fall back to the default, like a missing one.
fn parse_limit(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

pub(crate) async fn list_checkins(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CheckinsResponse>, ApiError> {
    let subject = parse_subject(query.subject.as_deref()).map_err(ApiError::Invalid)?;
    let checkins = state
        .service
        .list(&subject, parse_limit(query.limit.as_deref()))
        .await
        .map_err(|err| ApiError::from_checkin(err, "retrieve check-ins"))?;
    Ok(Json(CheckinsResponse {
        success: true,
        checkins,
    }))
}

pub(crate) async fn get_checkin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CheckinResponse>, ApiError> {
    let checkin = state
        .service
        .get(&ObservationId::new(id))
        .await
        .map_err(|err| ApiError::from_checkin(err, "retrieve check-in"))?;
    Ok(Json(CheckinResponse {
        success: true,
        checkin,
    }))
}

/// Submission runs on its own task so a dropped connection cannot cancel it.
pub(crate) async fn create_checkin(
    State(state): State<AppState>,
    body: Result<Json<CheckinInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckinResponse>), ApiError> {
    let Json(input) = body.map_err(|_| ApiError::BadRequest("Invalid request body".to_string()))?;
    let service = state.service.clone();
    let checkin = tokio::spawn(async move { service.submit(input).await })
        .await
        .map_err(|err| {
            error!("check-in task failed (error={})", err);
            ApiError::Internal("Failed to create check-in".to_string())
        })?
        .map_err(|err| ApiError::from_checkin(err, "create check-in"))?;
    Ok((
        StatusCode::CREATED,
        Json(CheckinResponse {
            success: true,
            checkin,
        }),
    ))
}
