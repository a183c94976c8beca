//! # Tenancy Core - Domain Module
//! 
//! Domain entities for multi-tenant routing.

pub mod tenant;
pub mod tenant_id;

pub use tenant::{Tenant, TenantStatus};
pub use tenant_id::{sanitize, TenantId};
