//! Request and response payloads for tenant endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenancy_core::{Tenant, TenantStatus};
use tenancy_shared::config::ResolutionSource;
use uuid::Uuid;
use validator::Validate;

/// POST /api/v1/tenants
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    /// Sanitized before use; the stored schema name is returned.
    #[validate(length(min = 1, max = 63))]
    pub schema_name: String,
    #[serde(default)]
    pub activate: bool,
}

/// PATCH /api/v1/tenants/{id}/status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TenantStatus,
}

/// PATCH /api/v1/tenants/{id}/name
#[derive(Debug, Deserialize, Validate)]
pub struct RenameTenantRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TenantDto {
    pub id: Uuid,
    pub name: String,
    pub schema_name: String,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<Tenant> for TenantDto {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            schema_name: tenant.schema_name().to_string(),
            name: tenant.name,
            status: tenant.status,
            created_at: tenant.created_at,
            modified_at: tenant.modified_at,
        }
    }
}

/// GET /api/v1/tenant/current
#[derive(Debug, Serialize)]
pub struct CurrentTenantResponse {
    pub tenant_id: String,
    pub source: ResolutionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantDto>,
    /// `current_schema()` as seen by a routed transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_schema: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenancy_core::TenantId;

    #[test]
    fn test_create_request_validation() {
        let ok = CreateTenantRequest {
            name: "Acme".to_string(),
            schema_name: "acme".to_string(),
            activate: true,
        };
        assert!(ok.validate().is_ok());

        let short_name = CreateTenantRequest {
            name: "A".to_string(),
            ..ok
        };
        assert!(short_name.validate().is_err());
    }

    #[test]
    fn test_status_request_uses_wire_names() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"SUSPENDED"}"#).unwrap();
        assert_eq!(req.status, TenantStatus::Suspended);
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"gone"}"#).is_err());
    }

    #[test]
    fn test_tenant_dto_exposes_schema_name() {
        let tenant = Tenant::new("Acme".to_string(), TenantId::new("acme"), TenantStatus::Active).unwrap();
        let json = serde_json::to_value(TenantDto::from(tenant)).unwrap();
        assert_eq!(json["schema_name"], "acme");
        assert_eq!(json["status"], "ACTIVE");
        assert!(json.get("modified_at").is_none());
    }
}
