//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dbsettings_core::SettingsError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Setting not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Settings(SettingsError::FormNotFound(_)) => {
                (StatusCode::NOT_FOUND, "form_not_found")
            }
            ApiError::Settings(SettingsError::InvalidFormConfig(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid_form_config")
            }
            ApiError::Settings(SettingsError::Database(_))
            | ApiError::Settings(SettingsError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
            }
            ApiError::Settings(SettingsError::Serialization(_)) => {
                (StatusCode::BAD_REQUEST, "serialization_error")
            }
            ApiError::Settings(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "code": code
        }));
        (status, body).into_response()
    }
}
