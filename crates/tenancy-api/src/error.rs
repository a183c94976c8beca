use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tenancy_core::DomainError;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Tenant identifier required")]
    TenantRequired,

    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TenantRequired | ApiError::InvalidTenant(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::TenantRequired => "TENANT_REQUIRED",
            ApiError::InvalidTenant(_) => "INVALID_TENANT",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::BadRequest(_) => "VALIDATION_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::TenantNotFoundById(_)
            | DomainError::TenantNotFoundBySchema(_)
            | DomainError::TenantSchemaMissing(_) => ApiError::NotFound(e.to_string()),
            DomainError::TenantNotActive(_) => ApiError::Forbidden(e.to_string()),
            DomainError::SchemaNameAlreadyExists(_) => ApiError::Conflict(e.to_string()),
            DomainError::InvalidTenantIdentifier(msg) => ApiError::InvalidTenant(msg),
            DomainError::ValidationError(msg) => ApiError::BadRequest(msg),
            // a tenant-scoped route ran without the resolution middleware
            DomainError::TenantContextMissing => ApiError::InternalError(e.to_string()),
            DomainError::DatabaseError(msg) => ApiError::DatabaseError(msg),
            DomainError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                "Database error".to_string()
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal error".to_string()
            }
            other => {
                tracing::warn!("{}", other);
                other.to_string()
            }
        };

        let body = Json(ApiResponse::<()>::error(self.code(), &message));
        (status, body).into_response()
    }
}
