// ============================================================================
// Tenancy Core - Tenant Entity
// File: crates/tenancy-core/src/domain/tenant.rs
// Description: Tenant entity with schema routing key and lifecycle status
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenancy_shared::{new_id, EntityId};
use validator::Validate;

use super::tenant_id::TenantId;

/// Tenant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Active,
    Inactive,
    PendingActivation,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "ACTIVE",
            TenantStatus::Inactive => "INACTIVE",
            TenantStatus::PendingActivation => "PENDING_ACTIVATION",
            TenantStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(TenantStatus::Active),
            "INACTIVE" => Some(TenantStatus::Inactive),
            "PENDING_ACTIVATION" => Some(TenantStatus::PendingActivation),
            "SUSPENDED" => Some(TenantStatus::Suspended),
            _ => None,
        }
    }
}

impl Default for TenantStatus {
    fn default() -> Self {
        TenantStatus::PendingActivation
    }
}

/// Tenant entity
///
/// `schema_name` is the physical routing key. It is fixed at creation; no
/// setter exists and repositories never write it on update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Tenant {
    pub id: EntityId,

    #[validate(length(min = 2, max = 100, message = "Tenant name must be between 2 and 100 characters"))]
    pub name: String,

    schema_name: TenantId,

    pub status: TenantStatus,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(
        name: String,
        schema_name: TenantId,
        status: TenantStatus,
    ) -> Result<Self, validator::ValidationErrors> {
        let tenant = Self {
            id: new_id(),
            name: name.trim().to_string(),
            schema_name,
            status,
            created_at: Utc::now(),
            modified_at: None,
        };

        tenant.validate()?;
        Ok(tenant)
    }

    /// Rebuilds a tenant from stored columns.
    pub fn from_parts(
        id: EntityId,
        name: String,
        schema_name: TenantId,
        status: TenantStatus,
        created_at: DateTime<Utc>,
        modified_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name,
            schema_name,
            status,
            created_at,
            modified_at,
        }
    }

    pub fn schema_name(&self) -> &TenantId {
        &self.schema_name
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    pub fn set_status(&mut self, status: TenantStatus) {
        self.status = status;
        self.modified_at = Some(Utc::now());
    }

    pub fn rename(&mut self, name: String) -> Result<(), validator::ValidationErrors> {
        let previous = std::mem::replace(&mut self.name, name.trim().to_string());
        if let Err(e) = self.validate() {
            self.name = previous;
            return Err(e);
        }
        self.modified_at = Some(Utc::now());
        Ok(())
    }
}
