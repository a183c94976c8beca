// ============================================================================
// Tenancy Core - Tenant Service
// File: crates/tenancy-core/src/services/tenant_service.rs
// ============================================================================
//! Tenant registry service: registration, status changes, and resolution
//! of the tenant a request is routed to.

use std::sync::Arc;

use tenancy_shared::Pagination;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Tenant, TenantId, TenantStatus};
use crate::error::DomainError;
use crate::repositories::TenantRepository;

/// Tenant service over any [`TenantRepository`]
pub struct TenantService<R: TenantRepository + ?Sized> {
    tenant_repo: Arc<R>,
}

impl<R: TenantRepository + ?Sized> Clone for TenantService<R> {
    fn clone(&self) -> Self {
        Self {
            tenant_repo: self.tenant_repo.clone(),
        }
    }
}

impl<R: TenantRepository + ?Sized> TenantService<R> {
    pub fn new(tenant_repo: Arc<R>) -> Self {
        Self { tenant_repo }
    }

    /// Register a new tenant
    ///
    /// `schema_candidate` is sanitized; the tenant starts ACTIVE when
    /// `activate` is set and PENDING_ACTIVATION otherwise.
    pub async fn register(
        &self,
        name: &str,
        schema_candidate: &str,
        activate: bool,
    ) -> Result<Tenant, DomainError> {
        let schema_name = TenantId::parse(schema_candidate)?;
        info!("Registering tenant {} with schema {}", name, schema_name);

        // 1. Check schema uniqueness
        if self.tenant_repo.find_by_schema_name(&schema_name).await?.is_some() {
            warn!("Registration failed: schema already exists: {}", schema_name);
            return Err(DomainError::SchemaNameAlreadyExists(schema_name.into_inner()));
        }

        // 2. Build entity
        let status = if activate {
            TenantStatus::Active
        } else {
            TenantStatus::PendingActivation
        };
        let tenant = Tenant::new(name.to_string(), schema_name, status)?;

        // 3. Persist and provision
        let created = self.tenant_repo.create(&tenant).await?;
        info!("Tenant registered: {} ({})", created.id, created.schema_name());
        Ok(created)
    }

    /// Resolve the tenant a request is routed to
    ///
    /// Fails when the schema is unknown or the tenant is not ACTIVE.
    pub async fn resolve_active(&self, tenant_id: &TenantId) -> Result<Tenant, DomainError> {
        let tenant = self
            .tenant_repo
            .find_by_schema_name(tenant_id)
            .await?
            .ok_or_else(|| {
                warn!("Unknown tenant: {}", tenant_id);
                DomainError::TenantNotFoundBySchema(tenant_id.to_string())
            })?;

        if !tenant.is_active() {
            warn!("Tenant {} is {}", tenant_id, tenant.status.as_str());
            return Err(DomainError::TenantNotActive(tenant_id.to_string()));
        }

        Ok(tenant)
    }

    pub async fn get(&self, id: &Uuid) -> Result<Tenant, DomainError> {
        self.tenant_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TenantNotFoundById(*id))
    }

    pub async fn list(&self, pagination: &Pagination) -> Result<Vec<Tenant>, DomainError> {
        self.tenant_repo.list(pagination).await
    }

    /// Any transition is allowed; callers own the lifecycle.
    pub async fn change_status(&self, id: &Uuid, status: TenantStatus) -> Result<Tenant, DomainError> {
        let updated = self.tenant_repo.update_status(id, status).await?;
        info!("Tenant {} status changed to {}", id, status.as_str());
        Ok(updated)
    }

    pub async fn rename(&self, id: &Uuid, name: &str) -> Result<Tenant, DomainError> {
        let updated = self.tenant_repo.update_name(id, name).await?;
        info!("Tenant {} renamed", id);
        Ok(updated)
    }
}
