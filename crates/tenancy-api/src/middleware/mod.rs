pub mod tenant_resolution;

pub use tenant_resolution::{tenant_resolution_middleware, ResolvedTenant, TenantResolver};
