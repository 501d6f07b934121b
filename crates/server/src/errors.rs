use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::views::ViewError;

/// JSON error body: `{"error": title, "detail": detail}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = ?self.detail, "request failed");
        }
        let body = serde_json::json!({"error": self.title, "detail": self.detail});
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let detail = Some(e.detail().to_string());
        match e {
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", detail),
            ServiceError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail),
            ServiceError::Seed(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail),
        }
    }
}

impl From<ViewError> for JsonApiError {
    fn from(e: ViewError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Render Error", Some(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store initialisation failed: {0}")]
    Store(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status_codes() {
        let nf: JsonApiError = ServiceError::not_found("Could not find car by Id").into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.detail.as_deref(), Some("Could not find car by Id"));

        let bad: JsonApiError = ServiceError::validation("No cars to add").into();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let seed: JsonApiError = ServiceError::Seed("boom".into()).into();
        assert_eq!(seed.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn view_errors_are_internal() {
        let e: JsonApiError = ViewError::UnknownView("nope".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
