//! # Tenancy Core
//! 
//! Tenant entities, the per-request tenant context, services, and
//! repository traits.

pub mod domain;
pub mod context;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use context::{TenantContext, TenantGuard};
pub use error::DomainError;
