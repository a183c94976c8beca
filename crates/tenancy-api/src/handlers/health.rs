//! Liveness and readiness probes

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health/ready
///
/// Checks the database when one is configured.
pub async fn readiness(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let database = match &state.schema_router {
        Some(router) => {
            router.ping().await?;
            "ok"
        }
        None => "not_configured",
    };

    Ok(Json(json!({
        "status": "ready",
        "database": database,
    })))
}
