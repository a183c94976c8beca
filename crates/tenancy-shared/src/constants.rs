//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TENANT_HEADER: &str = "X-Tenant-ID";
pub const DEFAULT_TENANT_CLAIM: &str = "tenant";
/// PostgreSQL truncates identifiers beyond this many bytes.
pub const MAX_SCHEMA_NAME_LENGTH: usize = 63;
pub const SCHEMA_PLACEHOLDER: char = '_';
