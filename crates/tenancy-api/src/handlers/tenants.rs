// ============================================================================
// Tenancy API - Tenant Registry Handlers
// File: crates/tenancy-api/src/handlers/tenants.rs
// ============================================================================
//! Registry administration. These routes are not tenant-scoped.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tenancy_shared::Pagination;
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateTenantRequest, RenameTenantRequest, TenantDto, UpdateStatusRequest};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/tenants
pub async fn create_tenant(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TenantDto>>), ApiError> {
    payload.validate()?;

    let tenant = state
        .tenant_service
        .register(&payload.name, &payload.schema_name, payload.activate)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(tenant.into()))))
}

/// GET /api/v1/tenants?page=&per_page=
pub async fn list_tenants(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Vec<TenantDto>>>, ApiError> {
    let tenants = state.tenant_service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        tenants.into_iter().map(TenantDto::from).collect(),
    )))
}

/// GET /api/v1/tenants/{id}
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TenantDto>>, ApiError> {
    let tenant = state.tenant_service.get(&id).await?;
    Ok(Json(ApiResponse::success(tenant.into())))
}

/// PATCH /api/v1/tenants/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<TenantDto>>, ApiError> {
    let tenant = state.tenant_service.change_status(&id, payload.status).await?;
    Ok(Json(ApiResponse::success(tenant.into())))
}

/// PATCH /api/v1/tenants/{id}/name
pub async fn rename_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenameTenantRequest>,
) -> Result<Json<ApiResponse<TenantDto>>, ApiError> {
    payload.validate()?;
    let tenant = state.tenant_service.rename(&id, &payload.name).await?;
    Ok(Json(ApiResponse::success(tenant.into())))
}
