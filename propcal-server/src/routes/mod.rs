pub mod calendar;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use propcal_core::CalendarError;
use serde::Serialize;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses
pub enum AppError {
    NotFound(String),
    Other(anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        let AppError::Other(err) = self else {
            return StatusCode::NOT_FOUND;
        };

        match err.downcast_ref::<CalendarError>() {
            Some(CalendarError::PropertyNotFound(_)) => StatusCode::NOT_FOUND,
            Some(CalendarError::InvalidPropertyId(_) | CalendarError::InvalidDate { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Some(CalendarError::FetchTimeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Some(e) if e.is_fetch_error() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::NotFound(msg) => msg,
            AppError::Other(err) => err.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Other(err.into())
    }
}
