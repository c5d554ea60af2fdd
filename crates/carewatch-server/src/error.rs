//! API error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use carewatch_core::{CheckinError, ValidationError};
use carewatch_protocol::ObservationId;
use log::error;
use serde::Serialize;

/// Failures returned to HTTP clients as `{"success": false, ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Invalid(ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
    /// The check-in was stored but its assessment could not be saved.
    #[error("Check-in was saved but its feedback could not be stored")]
    Enrichment(ObservationId),
}

impl ApiError {
    /// Map a pipeline error; `action` names the failed operation for 500s.
    pub fn from_checkin(err: CheckinError, action: &str) -> Self {
        match err {
            CheckinError::Validation(validation) => ApiError::Invalid(validation),
            CheckinError::NotFound(_) => ApiError::NotFound,
            CheckinError::Storage(source) => {
                error!("storage failure (action={}, error={})", action, source);
                ApiError::Internal(format!("Failed to {action}"))
            }
            CheckinError::Enrichment {
                observation_id,
                source,
            } => {
                error!(
                    "assessment not stored (observation_id={}, error={})",
                    observation_id, source
                );
                ApiError::Enrichment(observation_id)
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Enrichment(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkin_id: Option<ObservationId>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();
        let (errors, checkin_id) = match self {
            ApiError::Invalid(validation) => (validation.messages, None),
            ApiError::Enrichment(id) => (Vec::new(), Some(id)),
            _ => (Vec::new(), None),
        };
        let body = ErrorBody {
            success: false,
            error,
            errors,
            checkin_id,
        };
        (status, Json(body)).into_response()
    }
}
