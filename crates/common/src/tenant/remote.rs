//! Remote tenant store validator
//!
//! Calls `GET {base_url}/api/subdomains/validate/{slug}` on the tenant store.
//! Lookups are bounded by the configured timeout and always fail closed: a
//! transport failure is an error, never a valid tenant.

use super::{Plan, Tenant, TenantLookup, TenantValidator};
use crate::config::TenantStoreConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;

pub struct RemoteTenantService {
    base_url: String,
    timeout_ms: u64,
    http: reqwest::Client,
}

/// Wire format of the tenant store's validate endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResponse {
    exists: bool,
    #[serde(default)]
    active: bool,
    restaurant_id: Option<String>,
    restaurant_name: Option<String>,
    #[serde(default)]
    plan: Plan,
}

impl RemoteTenantService {
    pub fn new(config: &TenantStoreConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "tenants.base_url is required for remote validation".to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(config.lookup_timeout())
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to build tenant store client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.lookup_timeout_ms,
            http,
        })
    }

    fn endpoint(&self, slug: &str) -> String {
        format!("{}/api/subdomains/validate/{}", self.base_url, slug)
    }
}

fn lookup_from_response(slug: &str, body: ValidateResponse) -> TenantLookup {
    if !body.exists {
        return TenantLookup::NotFound;
    }
    let tenant = Tenant {
        slug: slug.to_string(),
        restaurant_id: body.restaurant_id.unwrap_or_default(),
        display_name: body.restaurant_name.unwrap_or_else(|| slug.to_string()),
        active: body.active,
        plan: body.plan,
    };
    if tenant.active {
        TenantLookup::Found(tenant)
    } else {
        TenantLookup::Inactive(tenant)
    }
}

#[async_trait]
impl TenantValidator for RemoteTenantService {
    async fn validate(&self, slug: &str) -> Result<TenantLookup> {
        let response = self
            .http
            .get(self.endpoint(slug))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::LookupTimeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    AppError::LookupFailure {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(TenantLookup::NotFound);
        }
        if !status.is_success() {
            return Err(AppError::LookupFailure {
                message: format!("tenant store returned {}", status),
            });
        }

        let body: ValidateResponse =
            response.json().await.map_err(|e| AppError::LookupFailure {
                message: format!("undecodable tenant store response: {}", e),
            })?;

        Ok(lookup_from_response(slug, body))
    }

    fn source(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> TenantStoreConfig {
        TenantStoreConfig {
            base_url: Some(base_url.to_string()),
            lookup_timeout_ms: 1500,
            validation_ttl_secs: 30,
            static_tenants: Vec::new(),
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let service = RemoteTenantService::new(&config("http://tenants.internal/")).unwrap();
        assert_eq!(
            service.endpoint("kardesler"),
            "http://tenants.internal/api/subdomains/validate/kardesler"
        );
    }

    #[test]
    fn test_requires_base_url() {
        let mut cfg = config("http://tenants.internal");
        cfg.base_url = None;
        assert!(RemoteTenantService::new(&cfg).is_err());
    }

    #[test]
    fn test_lookup_mapping_found() {
        let body: ValidateResponse = serde_json::from_str(
            r#"{
                "exists": true,
                "active": true,
                "restaurantId": "rst_1001",
                "restaurantName": "Kardesler Lokantasi",
                "plan": "premium",
                "ownerEmail": "owner@example.com",
                "createdAt": "2025-11-02T10:00:00Z"
            }"#,
        )
        .unwrap();

        match lookup_from_response("kardesler", body) {
            TenantLookup::Found(t) => {
                assert_eq!(t.restaurant_id, "rst_1001");
                assert_eq!(t.display_name, "Kardesler Lokantasi");
                assert_eq!(t.plan, Plan::Premium);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_mapping_inactive() {
        let body: ValidateResponse = serde_json::from_str(
            r#"{"exists": true, "active": false, "restaurantId": "rst_1002"}"#,
        )
        .unwrap();
        match lookup_from_response("eski-lokanta", body) {
            TenantLookup::Inactive(t) => {
                // Display name falls back to the slug when the store omits it
                assert_eq!(t.display_name, "eski-lokanta");
                assert!(!t.active);
            }
            other => panic!("expected Inactive, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_mapping_absent() {
        let body: ValidateResponse =
            serde_json::from_str(r#"{"exists": false}"#).unwrap();
        assert_eq!(
            lookup_from_response("unknown123", body),
            TenantLookup::NotFound
        );
    }
}
