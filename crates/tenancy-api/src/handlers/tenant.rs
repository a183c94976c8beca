// ============================================================================
// Tenancy API - Tenant-Scoped Handlers
// File: crates/tenancy-api/src/handlers/tenant.rs
// ============================================================================
//! Handlers mounted behind the tenant resolution middleware.

use axum::{extract::State, Extension, Json};
use tenancy_core::TenantContext;
use tracing::info;

use crate::dto::{CurrentTenantResponse, TenantDto};
use crate::error::ApiError;
use crate::middleware::ResolvedTenant;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/tenant/current
///
/// Reports the tenant read back from [`TenantContext`], not from the
/// request, so the response reflects what downstream code observes.
pub async fn current_tenant(
    State(state): State<AppState>,
    Extension(resolved): Extension<ResolvedTenant>,
) -> Result<Json<ApiResponse<CurrentTenantResponse>>, ApiError> {
    let tenant_id = TenantContext::require()?;
    info!("Serving current tenant");

    let database_schema = match &state.schema_router {
        Some(router) => router.current_schema().await?,
        None => None,
    };

    Ok(Json(ApiResponse::success(CurrentTenantResponse {
        tenant_id: tenant_id.into_inner(),
        source: resolved.source,
        tenant: resolved.tenant.map(TenantDto::from),
        database_schema,
    })))
}
