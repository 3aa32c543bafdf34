use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use weekly_core::error::WeeklyError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 Bad Request errors
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain for
/// request-shape problems that have no `WeeklyError` variant.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

/// HTTP status for a domain error.
pub fn status_for(err: &WeeklyError) -> StatusCode {
    match err {
        WeeklyError::MissingContext
        | WeeklyError::MissingMessage
        | WeeklyError::ChannelNotText(_) => StatusCode::BAD_REQUEST,
        WeeklyError::ChannelNotFound(_) => StatusCode::NOT_FOUND,
        WeeklyError::GenerationInFlight | WeeklyError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        WeeklyError::Generation(_) => StatusCode::BAD_GATEWAY,
        WeeklyError::PublishNotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
        WeeklyError::BoardFetch { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        WeeklyError::MissingCredentials(_)
        | WeeklyError::Publish(_)
        | WeeklyError::Io(_)
        | WeeklyError::Yaml(_)
        | WeeklyError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = match self.0.downcast_ref::<WeeklyError>() {
            Some(e) => status_for(e),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

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
