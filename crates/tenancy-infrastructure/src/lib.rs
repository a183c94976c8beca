//! # Tenancy Infrastructure
//! 
//! PostgreSQL adapters: tenant registry and per-tenant schema routing.

pub mod database;

pub use database::{create_pool, run_migrations, PgTenantRepository, SchemaRouter};
