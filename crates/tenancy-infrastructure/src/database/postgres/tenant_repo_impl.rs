// ============================================================================
// Tenancy Infrastructure - PostgreSQL Tenant Repository
// File: crates/tenancy-infrastructure/src/database/postgres/tenant_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tenancy_shared::Pagination;
use tracing::{error, info};
use uuid::Uuid;

use tenancy_core::domain::{Tenant, TenantId, TenantStatus};
use tenancy_core::error::DomainError;
use tenancy_core::repositories::TenantRepository;

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub schema_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = DomainError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let status = TenantStatus::from_str(&row.status).ok_or_else(|| {
            DomainError::DatabaseError(format!("unknown tenant status: {}", row.status))
        })?;
        Ok(Tenant::from_parts(
            row.id,
            row.name,
            TenantId::new(&row.schema_name),
            status,
            row.created_at,
            row.modified_at,
        ))
    }
}

fn database_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, schema_name, status, created_at, modified_at
            FROM public.tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("finding tenant by id", e))?;

        row.map(Tenant::try_from).transpose()
    }

    async fn find_by_schema_name(&self, schema_name: &TenantId) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, schema_name, status, created_at, modified_at
            FROM public.tenants
            WHERE schema_name = $1
            "#,
        )
        .bind(schema_name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("finding tenant by schema", e))?;

        row.map(Tenant::try_from).transpose()
    }

    async fn list(&self, pagination: &Pagination) -> Result<Vec<Tenant>, DomainError> {
        let rows: Vec<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, schema_name, status, created_at, modified_at
            FROM public.tenants
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(pagination.limit()))
        .bind(i64::from(pagination.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("listing tenants", e))?;

        rows.into_iter().map(Tenant::try_from).collect()
    }

    async fn create(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        info!("Creating tenant: {} ({})", tenant.name, tenant.schema_name());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("starting tenant transaction", e))?;

        let row: TenantRow = sqlx::query_as(
            r#"
            INSERT INTO public.tenants (id, name, schema_name, status, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, schema_name, status, created_at, modified_at
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(tenant.schema_name().as_str())
        .bind(tenant.status.as_str())
        .bind(tenant.created_at)
        .bind(tenant.modified_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::SchemaNameAlreadyExists(tenant.schema_name().to_string())
            } else {
                database_error("creating tenant", e)
            }
        })?;

        // identifiers cannot be bound; TenantId only holds [A-Za-z0-9_]
        let ddl = format!("CREATE SCHEMA IF NOT EXISTS {}", tenant.schema_name().quoted());
        sqlx::query(&ddl)
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("provisioning tenant schema", e))?;

        tx.commit()
            .await
            .map_err(|e| database_error("committing tenant", e))?;

        info!("Tenant created successfully: {}", row.id);
        row.try_into()
    }

    async fn update_status(&self, id: &Uuid, status: TenantStatus) -> Result<Tenant, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            UPDATE public.tenants
            SET status = $2, modified_at = NOW()
            WHERE id = $1
            RETURNING id, name, schema_name, status, created_at, modified_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("updating tenant status", e))?;

        row.ok_or(DomainError::TenantNotFoundById(*id))?.try_into()
    }

    async fn update_name(&self, id: &Uuid, name: &str) -> Result<Tenant, DomainError> {
        // run the entity's validation before touching the row
        let mut current = self
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TenantNotFoundById(*id))?;
        current.rename(name.to_string())?;

        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            UPDATE public.tenants
            SET name = $2, modified_at = NOW()
            WHERE id = $1
            RETURNING id, name, schema_name, status, created_at, modified_at
            "#,
        )
        .bind(id)
        .bind(&current.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("renaming tenant", e))?;

        row.ok_or(DomainError::TenantNotFoundById(*id))?.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> TenantRow {
        TenantRow {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            schema_name: "acme".to_string(),
            status: status.to_string(),
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    #[test]
    fn test_row_maps_to_tenant() {
        let tenant = Tenant::try_from(row("SUSPENDED")).unwrap();
        assert_eq!(tenant.status, TenantStatus::Suspended);
        assert_eq!(tenant.schema_name().as_str(), "acme");
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let err = Tenant::try_from(row("archived")).unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}
