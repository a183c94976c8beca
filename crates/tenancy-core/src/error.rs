//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tenant not found: {0}")]
    TenantNotFoundById(Uuid),

    #[error("Tenant not found for schema: {0}")]
    TenantNotFoundBySchema(String),

    #[error("Tenant not active: {0}")]
    TenantNotActive(String),

    #[error("Schema name already exists: {0}")]
    SchemaNameAlreadyExists(String),

    #[error("Invalid tenant identifier: {0}")]
    InvalidTenantIdentifier(String),

    /// The tenant resolved but its database schema does not exist.
    #[error("Tenant schema not provisioned: {0}")]
    TenantSchemaMissing(String),

    /// Tenant-scoped work was attempted with no tenant installed.
    #[error("No tenant in context")]
    TenantContextMissing,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(e: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(e.to_string())
    }
}
