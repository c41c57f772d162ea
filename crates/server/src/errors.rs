use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use tracing::error;

use crate::headers;

/// Problem body for rejected requests (`application/problem+json`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub status: u16,
    pub entity_name: &'static str,
    pub error_key: &'static str,
    pub message: String,
    pub params: &'static str,
}

/// 400 tagged with the entity it concerns and a machine-readable error key.
#[derive(Debug)]
pub struct BadRequestAlert {
    pub app_name: String,
    pub title: String,
    pub entity_name: &'static str,
    pub error_key: &'static str,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(BadRequestAlert),
    NotFound,
    Internal(String),
}

impl ApiError {
    pub fn bad_request(app_name: &str, title: impl Into<String>, entity_name: &'static str, error_key: &'static str) -> Self {
        Self::BadRequest(BadRequestAlert { app_name: app_name.to_string(), title: title.into(), entity_name, error_key })
    }

    /// Map a service failure for `entity_name`. Validation failures keep the
    /// service's message as the title.
    pub fn from_service(app_name: &str, entity_name: &'static str, err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::bad_request(app_name, msg, entity_name, "validation"),
            ServiceError::Model(models::errors::ModelError::Validation(msg)) => {
                Self::bad_request(app_name, msg, entity_name, "validation")
            }
            ServiceError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for BadRequestAlert {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = Problem {
            kind: "about:blank",
            title: self.title,
            status: status.as_u16(),
            entity_name: self.entity_name,
            error_key: self.error_key,
            message: format!("error.{}", self.error_key),
            params: self.entity_name,
        };
        let mut alert = headers::failure_alert(&self.app_name, self.entity_name, self.error_key);
        alert.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
        (status, alert, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(alert) => alert.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"error": msg}))).into_response()
            }
        }
    }
}
