// ============================================================================
// Tenancy Core - Tenant Identifier
// File: crates/tenancy-core/src/domain/tenant_id.rs
// Description: Sanitized routing key used as schema name and context value
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use tenancy_shared::constants::{MAX_SCHEMA_NAME_LENGTH, SCHEMA_PLACEHOLDER};

use crate::error::DomainError;

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
///
/// Total and deterministic: empty input yields empty output, length is not
/// limited and runs of placeholders are kept as-is. The output always has
/// the same number of characters as the input.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { SCHEMA_PLACEHOLDER })
        .collect()
}

/// A tenant routing key that has gone through [`sanitize`].
///
/// There is no way to build a `TenantId` from unsanitized text, so anything
/// holding one can splice it into a schema identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Sanitizes `raw` without further checks.
    pub fn new(raw: &str) -> Self {
        Self(sanitize(raw))
    }

    /// Sanitizes `raw` and rejects values that cannot be a schema name.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::InvalidTenantIdentifier(
                "tenant identifier is empty".to_string(),
            ));
        }
        if raw.chars().count() > MAX_SCHEMA_NAME_LENGTH {
            return Err(DomainError::InvalidTenantIdentifier(format!(
                "tenant identifier longer than {} characters",
                MAX_SCHEMA_NAME_LENGTH
            )));
        }
        Ok(Self::new(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use as a SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Deserialization goes through `new` so a payload cannot smuggle raw text in.
impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TenantId::new(&raw))
    }
}
