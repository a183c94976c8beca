use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};

use tenancy_api::{build_router, middleware::TenantResolver, AppState};
use tenancy_core::repositories::{InMemoryTenantRepository, TenantRepository};
use tenancy_infrastructure::{create_pool, run_migrations, PgTenantRepository, SchemaRouter};
use tenancy_shared::config::{AppConfig, RegistryBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    tenancy_shared::telemetry::init_telemetry();

    info!("Tenancy server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let resolver = TenantResolver::from_settings(&config.tenancy)?;

    // Registry backend
    let (tenant_repo, schema_router): (Arc<dyn TenantRepository>, Option<SchemaRouter>) =
        match config.tenancy.registry {
            RegistryBackend::Postgres => {
                info!("Connecting to database...");
                let pool = create_pool(&config.database).await?;
                run_migrations(&pool).await?;
                info!("Database connection established.");
                (
                    Arc::new(PgTenantRepository::new(pool.clone())),
                    Some(SchemaRouter::new(pool)),
                )
            }
            RegistryBackend::Memory => {
                warn!("Using in-memory tenant registry; tenants are lost on restart");
                (Arc::new(InMemoryTenantRepository::new()), None)
            }
        };

    let state = AppState::new(
        tenant_repo,
        schema_router,
        resolver,
        config.tenancy.verify_registry,
    );
    let app = build_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Tenancy server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
