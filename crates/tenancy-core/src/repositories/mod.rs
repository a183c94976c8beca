//! Repository traits (ports)

pub mod tenant_repository;
pub mod in_memory;

pub use tenant_repository::TenantRepository;
pub use in_memory::InMemoryTenantRepository;

#[cfg(test)]
pub use tenant_repository::MockTenantRepository;
