use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::middleware::tenant_resolution_middleware;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Public routes (no tenant)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness));

    // Registry administration (no tenant)
    let admin_routes = Router::new()
        .route(
            "/api/v1/tenants",
            get(handlers::tenants::list_tenants).post(handlers::tenants::create_tenant),
        )
        .route("/api/v1/tenants/{id}", get(handlers::tenants::get_tenant))
        .route(
            "/api/v1/tenants/{id}/status",
            patch(handlers::tenants::update_status),
        )
        .route(
            "/api/v1/tenants/{id}/name",
            patch(handlers::tenants::rename_tenant),
        );

    // Tenant-scoped routes
    let tenant_routes = Router::new()
        .route(
            "/api/v1/tenant/current",
            get(handlers::tenant::current_tenant),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_resolution_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(tenant_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
