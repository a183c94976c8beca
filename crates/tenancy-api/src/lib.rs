//! # Tenancy API
//!
//! HTTP surface: tenant resolution middleware, tenant-scoped routes and
//! the tenant registry admin endpoints.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
