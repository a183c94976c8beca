// ============================================================================
// Tenancy API - Tenant Resolution Middleware
// File: crates/tenancy-api/src/middleware/tenant_resolution.rs
// ============================================================================
//! Extracts the tenant of an inbound request and runs the rest of the
//! request inside [`TenantContext::run`].
//!
//! Sources are tried in the configured order and the first one carrying a
//! value wins. A value that is present but unusable is rejected instead of
//! falling through to the next source.
//!
//! Every source keeps the case of the identifier it carries; only the
//! base-domain match of the subdomain source ignores case.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tenancy_core::{Tenant, TenantContext, TenantId};
use tenancy_shared::config::{ResolutionSource, TenancySettings};
use tenancy_shared::AppError;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// The tenant a request was routed to, available as a request extension.
#[derive(Debug, Clone)]
pub struct ResolvedTenant {
    pub tenant_id: TenantId,
    pub source: ResolutionSource,
    /// Registry entry, when registry verification is enabled.
    pub tenant: Option<Tenant>,
}

pub struct TenantResolver {
    sources: Vec<ResolutionSource>,
    header_name: HeaderName,
    base_domain: Option<String>,
    claim_name: String,
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl TenantResolver {
    pub fn from_settings(settings: &TenancySettings) -> Result<Self, AppError> {
        let header_name = HeaderName::from_bytes(settings.header_name.trim().as_bytes())
            .map_err(|e| {
                AppError::InvalidConfig(format!(
                    "tenancy.header_name '{}' is not a valid header name: {}",
                    settings.header_name, e
                ))
            })?;

        let base_domain = settings
            .base_domain
            .as_deref()
            .map(|d| d.trim().trim_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty());

        Ok(Self {
            sources: settings.sources.clone(),
            header_name,
            base_domain,
            claim_name: settings.claim_name.clone(),
            decoding_key: settings
                .jwt_secret
                .as_deref()
                .map(|secret| DecodingKey::from_secret(secret.as_bytes())),
            validation: Validation::new(Algorithm::HS256),
        })
    }

    /// Resolves and sanitizes the tenant identifier carried by `headers`.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<(TenantId, ResolutionSource), ApiError> {
        for source in &self.sources {
            let raw = match source {
                ResolutionSource::Header => self.from_header(headers)?,
                ResolutionSource::Subdomain => self.from_subdomain(headers),
                ResolutionSource::Claim => self.from_claim(headers)?,
            };

            if let Some(raw) = raw {
                let tenant_id = TenantId::parse(&raw)?;
                debug!(tenant_id = %tenant_id, source = ?source, "tenant resolved");
                return Ok((tenant_id, *source));
            }
        }

        Err(ApiError::TenantRequired)
    }

    fn from_header(&self, headers: &HeaderMap) -> Result<Option<String>, ApiError> {
        let Some(value) = headers.get(&self.header_name) else {
            return Ok(None);
        };
        let value = value.to_str().map_err(|_| {
            ApiError::InvalidTenant(format!("{} header is not valid ASCII", self.header_name))
        })?;
        let value = value.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    fn from_subdomain(&self, headers: &HeaderMap) -> Option<String> {
        let base = self.base_domain.as_deref()?;
        let host = headers.get(header::HOST)?.to_str().ok()?;
        subdomain_label(host, base)
    }

    fn from_claim(&self, headers: &HeaderMap) -> Result<Option<String>, ApiError> {
        let Some(key) = &self.decoding_key else {
            return Ok(None);
        };
        let Some(token) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
        else {
            return Ok(None);
        };

        let claims = decode::<Map<String, Value>>(token, key, &self.validation)
            .map_err(|e| {
                warn!("Rejected bearer token: {}", e);
                ApiError::Unauthorized("Invalid bearer token".to_string())
            })?
            .claims;

        match claims.get(&self.claim_name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(tenant)) => Ok(Some(tenant.clone())),
            Some(_) => Err(ApiError::InvalidTenant(format!(
                "claim '{}' must be a string",
                self.claim_name
            ))),
        }
    }
}

/// Token of a `Bearer` credential; the scheme name is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

/// First label of `host` when it sits under `base` (lowercase); ports are
/// ignored. The label keeps its case.
fn subdomain_label(host: &str, base: &str) -> Option<String> {
    // bracketed IPv6 literal
    if host.starts_with('[') {
        return None;
    }
    let host = host.split(':').next().unwrap_or(host).trim_end_matches('.');

    // ASCII lowercasing keeps byte offsets, so the length indexes `host` too
    let lowered = host.to_ascii_lowercase();
    let prefix_len = lowered.strip_suffix(base)?.strip_suffix('.')?.len();
    let label = host[..prefix_len].split('.').next()?;
    (!label.is_empty()).then(|| label.to_string())
}

/// Resolves the tenant, optionally checks it against the registry, and runs
/// the remaining stack with the tenant installed.
pub async fn tenant_resolution_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (tenant_id, source) = state.resolver.resolve(request.headers())?;

    let tenant = if state.verify_registry {
        Some(state.tenant_service.resolve_active(&tenant_id).await?)
    } else {
        None
    };

    request.extensions_mut().insert(ResolvedTenant {
        tenant_id: tenant_id.clone(),
        source,
        tenant,
    });

    Ok(TenantContext::run(tenant_id, next.run(request)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn settings(sources: Vec<ResolutionSource>) -> TenancySettings {
        TenancySettings {
            sources,
            base_domain: Some("example.com".to_string()),
            jwt_secret: Some(SECRET.to_string()),
            ..TenancySettings::default()
        }
    }

    fn resolver(sources: Vec<ResolutionSource>) -> TenantResolver {
        TenantResolver::from_settings(&settings(sources)).unwrap()
    }

    fn token(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_header_is_sanitized() {
        let r = resolver(vec![ResolutionSource::Header]);
        let (id, source) = r.resolve(&headers(&[("x-tenant-id", "acme-corp")])).unwrap();
        assert_eq!(id.as_str(), "acme_corp");
        assert_eq!(source, ResolutionSource::Header);
    }

    #[test]
    fn test_missing_everywhere_is_tenant_required() {
        let r = resolver(vec![
            ResolutionSource::Header,
            ResolutionSource::Subdomain,
            ResolutionSource::Claim,
        ]);
        let err = r.resolve(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::TenantRequired));
    }

    #[test]
    fn test_blank_header_falls_through() {
        let r = resolver(vec![ResolutionSource::Header, ResolutionSource::Subdomain]);
        let (id, source) = r
            .resolve(&headers(&[("x-tenant-id", "  "), ("host", "globex.example.com")]))
            .unwrap();
        assert_eq!(id.as_str(), "globex");
        assert_eq!(source, ResolutionSource::Subdomain);
    }

    #[test]
    fn test_overlong_header_is_invalid() {
        let r = resolver(vec![ResolutionSource::Header]);
        let raw = "a".repeat(64);
        let err = r.resolve(&headers(&[("x-tenant-id", &raw)])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidTenant(_)));
    }

    #[test]
    fn test_source_order_is_respected() {
        let r = resolver(vec![ResolutionSource::Subdomain, ResolutionSource::Header]);
        let (id, _) = r
            .resolve(&headers(&[("x-tenant-id", "acme"), ("host", "globex.example.com:8080")]))
            .unwrap();
        assert_eq!(id.as_str(), "globex");
    }

    #[test]
    fn test_subdomain_label() {
        assert_eq!(subdomain_label("acme.example.com", "example.com").as_deref(), Some("acme"));
        assert_eq!(subdomain_label("ACME.Example.com.", "example.com").as_deref(), Some("ACME"));
        assert_eq!(subdomain_label("AcmeCorp.example.com", "example.com").as_deref(), Some("AcmeCorp"));
        assert_eq!(subdomain_label("eu.acme.example.com", "example.com").as_deref(), Some("eu"));
        assert_eq!(subdomain_label("acme.example.com:443", "example.com").as_deref(), Some("acme"));
        assert_eq!(subdomain_label("example.com", "example.com"), None);
        assert_eq!(subdomain_label("acme.other.com", "example.com"), None);
        assert_eq!(subdomain_label("acmeexample.com", "example.com"), None);
        assert_eq!(subdomain_label("[::1]:8080", "example.com"), None);
    }

    #[test]
    fn test_subdomain_without_base_domain_is_skipped() {
        let r = TenantResolver::from_settings(&TenancySettings {
            sources: vec![ResolutionSource::Subdomain],
            ..TenancySettings::default()
        })
        .unwrap();
        let err = r.resolve(&headers(&[("host", "acme.example.com")])).unwrap_err();
        assert!(matches!(err, ApiError::TenantRequired));
    }

    #[test]
    fn test_claim_is_read_from_valid_token() {
        let r = resolver(vec![ResolutionSource::Claim]);
        let bearer = format!("Bearer {}", token(json!({ "tenant": "initech", "exp": future_exp() })));
        let (id, source) = r.resolve(&headers(&[("authorization", &bearer)])).unwrap();
        assert_eq!(id.as_str(), "initech");
        assert_eq!(source, ResolutionSource::Claim);
    }

    #[test]
    fn test_subdomain_keeps_case_like_header() {
        let r = resolver(vec![ResolutionSource::Subdomain, ResolutionSource::Header]);
        let (by_host, _) = r.resolve(&headers(&[("host", "AcmeCorp.example.com")])).unwrap();
        let (by_header, _) = r.resolve(&headers(&[("x-tenant-id", "AcmeCorp")])).unwrap();
        assert_eq!(by_host, by_header);
        assert_eq!(by_host.as_str(), "AcmeCorp");
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let r = resolver(vec![ResolutionSource::Claim]);
        let jwt = token(json!({ "tenant": "initech", "exp": future_exp() }));
        for scheme in ["Bearer", "bearer", "BEARER"] {
            let value = format!("{} {}", scheme, jwt);
            let (id, _) = r.resolve(&headers(&[("authorization", &value)])).unwrap();
            assert_eq!(id.as_str(), "initech");
        }
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
    }

    #[test]
    fn test_bad_signature_is_unauthorized() {
        let r = resolver(vec![ResolutionSource::Claim]);
        let forged = encode(
            &Header::default(),
            &json!({ "tenant": "initech", "exp": future_exp() }),
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();
        let bearer = format!("Bearer {}", forged);
        let err = r.resolve(&headers(&[("authorization", &bearer)])).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let r = resolver(vec![ResolutionSource::Claim]);
        let expired = chrono::Utc::now().timestamp() - 3600;
        let bearer = format!("Bearer {}", token(json!({ "tenant": "initech", "exp": expired })));
        let err = r.resolve(&headers(&[("authorization", &bearer)])).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_token_without_claim_falls_through() {
        let r = resolver(vec![ResolutionSource::Claim, ResolutionSource::Header]);
        let bearer = format!("Bearer {}", token(json!({ "sub": "u1", "exp": future_exp() })));
        let (id, source) = r
            .resolve(&headers(&[("authorization", &bearer), ("x-tenant-id", "acme")]))
            .unwrap();
        assert_eq!(id.as_str(), "acme");
        assert_eq!(source, ResolutionSource::Header);
    }

    #[test]
    fn test_non_string_claim_is_invalid() {
        let r = resolver(vec![ResolutionSource::Claim]);
        let bearer = format!("Bearer {}", token(json!({ "tenant": 42, "exp": future_exp() })));
        let err = r.resolve(&headers(&[("authorization", &bearer)])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidTenant(_)));
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        let result = TenantResolver::from_settings(&TenancySettings {
            header_name: "bad header".to_string(),
            ..TenancySettings::default()
        });
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }
}
