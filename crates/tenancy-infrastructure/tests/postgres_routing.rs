//! Runs against a live PostgreSQL pointed to by `TEST_DATABASE_URL`.
//!
//! `cargo test -p tenancy-infrastructure -- --ignored`

use std::sync::Arc;

use tenancy_core::repositories::TenantRepository;
use tenancy_core::services::TenantService;
use tenancy_core::{DomainError, TenantContext, TenantId, TenantStatus};
use tenancy_infrastructure::{run_migrations, PgTenantRepository, SchemaRouter};
use sqlx::PgPool;
use tenancy_shared::config::DatabaseSettings;

async fn connect() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = tenancy_infrastructure::create_pool(&DatabaseSettings {
        url,
        max_connections: 1,
        min_connections: 0,
        acquire_timeout_secs: 5,
    })
    .await
    .expect("connect");
    run_migrations(&pool).await.expect("migrate");
    pool
}

async fn setup() -> (SchemaRouter, Arc<PgTenantRepository>) {
    let pool = connect().await;
    (
        SchemaRouter::new(pool.clone()),
        Arc::new(PgTenantRepository::new(pool)),
    )
}

fn unique_schema(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore]
async fn test_register_provisions_schema_and_routes() {
    let (router, repo) = setup().await;
    let service = TenantService::new(repo.clone());

    let schema = unique_schema("acme");
    let tenant = service.register("Acme", &schema, true).await.unwrap();
    assert_eq!(tenant.schema_name().as_str(), schema);

    let current = TenantContext::run(TenantId::new(&schema), router.current_schema())
        .await
        .unwrap();
    assert_eq!(current.as_deref(), Some(schema.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_pool_connection_does_not_keep_search_path() {
    // one connection, so the second checkout reuses the first one
    let pool = connect().await;
    let router = SchemaRouter::new(pool.clone());
    let repo = Arc::new(PgTenantRepository::new(pool.clone()));
    let schema = unique_schema("leak");
    TenantService::new(repo).register("Leak Check", &schema, true).await.unwrap();

    TenantContext::run(TenantId::new(&schema), async {
        let mut tx = router.begin().await.unwrap();
        sqlx::query("SELECT 1").execute(&mut *tx).await.unwrap();
        tx.commit().await.unwrap();
    })
    .await;

    let schema_after: Option<String> = sqlx::query_scalar("SELECT current_schema()")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(schema_after.as_deref(), Some("public"));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_schema_maps_to_domain_error() {
    let (_router, repo) = setup().await;
    let service = TenantService::new(repo.clone());
    let schema = unique_schema("dup");
    service.register("First", &schema, true).await.unwrap();

    let duplicate = tenancy_core::Tenant::new(
        "Second".to_string(),
        TenantId::new(&schema),
        TenantStatus::Active,
    )
    .unwrap();
    let err = repo.create(&duplicate).await.unwrap_err();
    assert!(matches!(err, DomainError::SchemaNameAlreadyExists(_)));
}

#[tokio::test]
#[ignore]
async fn test_status_and_name_updates_keep_schema() {
    let (_router, repo) = setup().await;
    let service = TenantService::new(repo);
    let schema = unique_schema("upd");
    let tenant = service.register("Updatable", &schema, false).await.unwrap();

    let active = service
        .change_status(&tenant.id, TenantStatus::Active)
        .await
        .unwrap();
    assert_eq!(active.status, TenantStatus::Active);

    let renamed = service.rename(&tenant.id, "Renamed Tenant").await.unwrap();
    assert_eq!(renamed.name, "Renamed Tenant");
    assert_eq!(renamed.schema_name().as_str(), schema);
}

#[tokio::test]
#[ignore]
async fn test_unprovisioned_schema_fails_instead_of_using_public() {
    let (router, _repo) = setup().await;
    let ghost = TenantId::new(&unique_schema("ghost"));

    let err = TenantContext::run(ghost.clone(), router.current_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TenantSchemaMissing(_)));

    let err = router.begin_for(&ghost).await.unwrap_err();
    assert!(matches!(err, DomainError::TenantSchemaMissing(_)));
}

#[tokio::test]
#[ignore]
async fn test_tenant_transaction_cannot_see_shared_tables_unqualified() {
    let (router, repo) = setup().await;
    let schema = unique_schema("iso");
    TenantService::new(repo).register("Isolated", &schema, true).await.unwrap();

    TenantContext::run(TenantId::new(&schema), async {
        let mut tx = router.begin().await.unwrap();
        let unqualified = sqlx::query("SELECT count(*) FROM tenants")
            .execute(&mut *tx)
            .await;
        assert!(unqualified.is_err(), "registry table leaked into tenant search path");
    })
    .await;

    // qualified access to the registry still works
    let mut tx = router.begin_for(&TenantId::new(&schema)).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM public.tenants")
        .fetch_one(&mut *tx)
        .await
        .unwrap();
    assert!(count >= 1);
}
