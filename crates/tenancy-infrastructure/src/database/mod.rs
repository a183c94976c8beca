//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;
pub mod schema_router;

pub use connection::{create_pool, run_migrations};
pub use postgres::PgTenantRepository;
pub use schema_router::SchemaRouter;
