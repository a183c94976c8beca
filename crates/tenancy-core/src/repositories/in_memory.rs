//! In-memory tenant registry, used by tests and the `memory` registry backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tenancy_shared::Pagination;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Tenant, TenantId, TenantStatus};
use crate::error::DomainError;
use crate::repositories::TenantRepository;

pub struct InMemoryTenantRepository {
    tenants: Arc<RwLock<HashMap<Uuid, Tenant>>>,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self {
            tenants: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTenantRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(id).cloned())
    }

    async fn find_by_schema_name(&self, schema_name: &TenantId) -> Result<Option<Tenant>, DomainError> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .values()
            .find(|t| t.schema_name() == schema_name)
            .cloned())
    }

    async fn list(&self, pagination: &Pagination) -> Result<Vec<Tenant>, DomainError> {
        let tenants = self.tenants.read().await;
        let mut all: Vec<Tenant> = tenants.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect())
    }

    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write().await;
        if tenants.values().any(|t| t.schema_name() == tenant.schema_name()) {
            return Err(DomainError::SchemaNameAlreadyExists(
                tenant.schema_name().to_string(),
            ));
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant.clone())
    }

    async fn update_status(&self, id: &Uuid, status: TenantStatus) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write().await;
        let tenant = tenants
            .get_mut(id)
            .ok_or(DomainError::TenantNotFoundById(*id))?;
        tenant.set_status(status);
        Ok(tenant.clone())
    }

    async fn update_name(&self, id: &Uuid, name: &str) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write().await;
        let tenant = tenants
            .get_mut(id)
            .ok_or(DomainError::TenantNotFoundById(*id))?;
        tenant.rename(name.to_string())?;
        Ok(tenant.clone())
    }
}
