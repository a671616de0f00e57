//! Tenant identity and validation
//!
//! A tenant is a single restaurant account identified by its subdomain slug.
//! Validation maps a candidate slug to an outcome against the authoritative
//! tenant store, through one of two interchangeable strategies:
//! - [`StaticTenantDirectory`]: synchronous in-memory allow-list
//! - [`RemoteTenantService`]: asynchronous lookup against the tenant store
//!
//! [`CachedValidator`] decorates either strategy with a TTL-bounded cache.

mod cached;
mod directory;
mod remote;

pub use cached::CachedValidator;
pub use directory::StaticTenantDirectory;
pub use remote::RemoteTenantService;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subscription plan of a tenant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Basic,
    Premium,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Premium => "premium",
            Plan::Pro => "pro",
        }
    }
}

/// A single restaurant account, identified by a unique subdomain slug.
///
/// Slugs are immutable once assigned; tenants are deactivated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub slug: String,
    pub restaurant_id: String,
    pub display_name: String,
    pub active: bool,
    pub plan: Plan,
}

/// Outcome of validating a candidate slug against the tenant store.
///
/// Transport failures are not an outcome: they surface as errors and the
/// dispatcher fails closed on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantLookup {
    Found(Tenant),
    Inactive(Tenant),
    NotFound,
}

impl TenantLookup {
    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            TenantLookup::Found(_) => "found",
            TenantLookup::Inactive(_) => "inactive",
            TenantLookup::NotFound => "not_found",
        }
    }
}

/// A strategy for resolving a candidate slug to a tenant.
#[async_trait]
pub trait TenantValidator: Send + Sync {
    /// Validate a slug against the tenant store.
    ///
    /// The slug has already passed the hostname parser's charset and length
    /// rules; reserved words never reach this point.
    async fn validate(&self, slug: &str) -> Result<TenantLookup>;

    /// Short label for logs and metrics
    fn source(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_serde_roundtrip() {
        let json = serde_json::to_string(&Plan::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
        let plan: Plan = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(plan, Plan::Pro);
    }

    #[test]
    fn test_lookup_labels() {
        let tenant = Tenant {
            slug: "kardesler".into(),
            restaurant_id: "rst_1001".into(),
            display_name: "Kardesler Lokantasi".into(),
            active: true,
            plan: Plan::Basic,
        };
        assert_eq!(TenantLookup::Found(tenant.clone()).label(), "found");
        assert_eq!(TenantLookup::Inactive(tenant).label(), "inactive");
        assert_eq!(TenantLookup::NotFound.label(), "not_found");
    }
}
