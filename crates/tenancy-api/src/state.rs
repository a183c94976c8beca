use std::sync::Arc;

use tenancy_core::repositories::TenantRepository;
use tenancy_core::services::TenantService;
use tenancy_infrastructure::SchemaRouter;

use crate::middleware::TenantResolver;

#[derive(Clone)]
pub struct AppState {
    pub tenant_service: TenantService<dyn TenantRepository>,
    /// Absent when the registry runs in memory and no database is configured.
    pub schema_router: Option<SchemaRouter>,
    pub resolver: Arc<TenantResolver>,
    pub verify_registry: bool,
}

impl AppState {
    pub fn new(
        tenant_repo: Arc<dyn TenantRepository>,
        schema_router: Option<SchemaRouter>,
        resolver: TenantResolver,
        verify_registry: bool,
    ) -> Self {
        Self {
            tenant_service: TenantService::new(tenant_repo),
            schema_router,
            resolver: Arc::new(resolver),
            verify_registry,
        }
    }
}
