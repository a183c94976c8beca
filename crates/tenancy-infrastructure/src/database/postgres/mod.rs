//! PostgreSQL repository implementations

pub mod tenant_repo_impl;

pub use tenant_repo_impl::PgTenantRepository;
