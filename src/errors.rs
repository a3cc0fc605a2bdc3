use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "cliente inválido: 'ACME'",
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Human-readable error description
    pub error: String,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    DatabaseError(#[from] DbErr),

    #[error("Invalid request body")]
    BadRequest(String),

    #[error("{0}")]
    ValidationError(String),

    /// The high-volume list endpoint refuses to run without both date bounds.
    #[error("{0}")]
    MissingDateRange(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::ValidationError(message.into())
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Store failures are reported back to the caller as request failures.
            Self::DatabaseError(_)
            | Self::BadRequest(_)
            | Self::ValidationError(_)
            | Self::MissingDateRange(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            Self::HashError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the `error` field of the response body.
    /// Internal failures return a generic message.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(err) => store_message(err),
            Self::HashError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
    }
}

/// Unwraps sea-orm's layered error text down to the message the store reported.
fn store_message(err: &DbErr) -> String {
    match err {
        DbErr::Exec(inner) | DbErr::Query(inner) | DbErr::Conn(inner) => match inner {
            sea_orm::RuntimeErr::SqlxError(sqlx_err) => sqlx_err.to_string(),
            sea_orm::RuntimeErr::Internal(msg) => msg.clone(),
        },
        DbErr::Custom(msg) => msg.clone(),
        other => other.to_string(),
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let message = self.response_message();
        let request_id = current_request_id();
        let timestamp = chrono::Utc::now().to_rfc3339();

        if let Self::MissingDateRange(_) = self {
            let body = json!({
                "rows": [],
                "error": message,
                "request_id": request_id,
                "timestamp": timestamp,
            });
            return (status, Json(body)).into_response();
        }

        let err = ErrorResponse {
            error: message,
            request_id,
            timestamp,
        };

        (status, Json(err)).into_response()
    }
}
