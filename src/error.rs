//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Equipment not found: {0}")]
    EquipmentNotFound(String),

    #[error("Inventory item not found: {0}")]
    InventoryItemNotFound(String),

    #[error("Notification not found: {0}")]
    NotificationNotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<crate::dashboard::DashboardQueryError> for AppError {
    fn from(e: crate::dashboard::DashboardQueryError) -> Self {
        match e {
            crate::dashboard::DashboardQueryError::Database(e) => AppError::Database(e),
            crate::dashboard::DashboardQueryError::Domain(e) => AppError::Domain(e),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, "missing_header", Some(header.clone()))
            }

            // 401 Unauthorized
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key", None),

            // 403 Forbidden
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),

            // 404 Not Found
            AppError::OrderNotFound(id) => {
                (StatusCode::NOT_FOUND, "order_not_found", Some(id.clone()))
            }
            AppError::ProfileNotFound(id) => {
                (StatusCode::NOT_FOUND, "profile_not_found", Some(id.clone()))
            }
            AppError::EquipmentNotFound(id) => {
                (StatusCode::NOT_FOUND, "equipment_not_found", Some(id.clone()))
            }
            AppError::InventoryItemNotFound(id) => {
                (StatusCode::NOT_FOUND, "inventory_item_not_found", Some(id.clone()))
            }
            AppError::NotificationNotFound(id) => {
                (StatusCode::NOT_FOUND, "notification_not_found", Some(id.clone()))
            }

            // 429 Too Many Requests
            AppError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded", None)
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(ref domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::InvalidTransition { .. } => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "invalid_transition",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::InsufficientStock { .. } => (
                        StatusCode::BAD_REQUEST,
                        "insufficient_stock",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::InvalidAmount(msg) => {
                        (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                    }
                    DomainError::WrongRole { .. } => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "wrong_role",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::UnknownStatus(s)
                    | DomainError::UnknownRole(s)
                    | DomainError::UnknownPriority(s)
                    | DomainError::UnknownNotificationKind(s) => {
                        (StatusCode::BAD_REQUEST, "unknown_value", Some(s.clone()))
                    }
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
