use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use carewatch_core::validation::parse_subject;
use carewatch_protocol::{Profile, ProfileInput};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub(crate) struct ProfileQuery {
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ProfileResponse {
    success: bool,
    profile: Profile,
}

pub(crate) async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let subject = parse_subject(query.subject.as_deref()).map_err(ApiError::Invalid)?;
    let profile = state
        .service
        .profile(&subject)
        .await
        .map_err(|err| ApiError::from_checkin(err, "retrieve profile"))?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

pub(crate) async fn update_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    body: Result<Json<ProfileInput>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(input) = body.map_err(|_| ApiError::BadRequest("Invalid request body".to_string()))?;
    let subject = parse_subject(query.subject.as_deref()).map_err(ApiError::Invalid)?;
    let profile = state
        .service
        .update_profile(&subject, input)
        .await
        .map_err(|err| ApiError::from_checkin(err, "save profile"))?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}
