//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use zonelight_domain::error::ZonelightError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps failures to an HTTP response with the matching status code.
pub enum ApiError {
    Zonelight(ZonelightError),
    /// The request body could not be read as the expected JSON.
    Body(JsonRejection),
}

impl From<ZonelightError> for ApiError {
    fn from(err: ZonelightError) -> Self {
        Self::Zonelight(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        Self::Body(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Body(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            Self::Zonelight(ZonelightError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Zonelight(ZonelightError::NotFound(err)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            Self::Zonelight(err @ (ZonelightError::Storage(_) | ZonelightError::Light(_))) => {
                tracing::error!(error = %err, source = ?std::error::Error::source(err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
