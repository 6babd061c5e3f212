//! Mapping of [`ParkError`] onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parkwatch_types::{ErrorBody, ParkError};

/// Error returned by request handlers.
///
/// Rejected reports become `400 { "error": "<message>" }`; anything else is
/// a `500` carrying the error's display text.
#[derive(Debug)]
pub struct ApiError(pub ParkError);

impl From<ParkError> for ApiError {
    fn from(err: ParkError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            ParkError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, message = %message, "request failed");
        } else {
            tracing::debug!(status = %status, message = %message, "request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let resp = ApiError(ParkError::InvalidInput("Datos incompletos".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_errors_map_to_internal_error() {
        let resp = ApiError(ParkError::Serialization("boom".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
