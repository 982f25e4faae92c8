use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use remedy_core::error::RemedyError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(RemedyError::MalformedRequest(msg.into()).into())
    }

    /// Construct a 401 Unauthorized error with the given message.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(RemedyError::Unauthorized(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<RemedyError>() {
            match e {
                RemedyError::MalformedRequest(_) | RemedyError::InvalidScoreInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                RemedyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                RemedyError::InvalidConfig(_) | RemedyError::Io(_) | RemedyError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
