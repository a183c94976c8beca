//! Tenant repository trait (port)

use async_trait::async_trait;
use tenancy_shared::Pagination;
use uuid::Uuid;

use crate::domain::{Tenant, TenantId, TenantStatus};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError>;
    async fn find_by_schema_name(&self, schema_name: &TenantId) -> Result<Option<Tenant>, DomainError>;
    async fn list(&self, pagination: &Pagination) -> Result<Vec<Tenant>, DomainError>;
    /// Persists a new tenant and provisions its schema.
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError>;
    async fn update_status(&self, id: &Uuid, status: TenantStatus) -> Result<Tenant, DomainError>;
    async fn update_name(&self, id: &Uuid, name: &str) -> Result<Tenant, DomainError>;
}
