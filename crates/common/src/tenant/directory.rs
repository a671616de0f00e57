//! Static allow-list validator
//!
//! Used at edge deployments that cannot reach the authoritative store, and
//! as the authoritative source in development. The entries are injected from
//! configuration at construction; nothing is mutated at runtime.

use super::{Tenant, TenantLookup, TenantValidator};
use crate::config::StaticTenant;
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub struct StaticTenantDirectory {
    tenants: HashMap<String, Tenant>,
}

impl StaticTenantDirectory {
    /// Build a directory from configuration entries
    pub fn new(entries: &[StaticTenant]) -> Self {
        Self::from_tenants(entries.iter().map(Tenant::from).collect())
    }

    pub fn from_tenants(tenants: Vec<Tenant>) -> Self {
        let tenants = tenants
            .into_iter()
            .map(|t| (t.slug.clone(), t))
            .collect();
        Self { tenants }
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

#[async_trait]
impl TenantValidator for StaticTenantDirectory {
    async fn validate(&self, slug: &str) -> Result<TenantLookup> {
        match self.tenants.get(slug) {
            Some(tenant) if tenant.active => Ok(TenantLookup::Found(tenant.clone())),
            Some(tenant) => Ok(TenantLookup::Inactive(tenant.clone())),
            None => Ok(TenantLookup::NotFound),
        }
    }

    fn source(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::Plan;

    fn directory() -> StaticTenantDirectory {
        StaticTenantDirectory::from_tenants(vec![
            Tenant {
                slug: "kardesler".into(),
                restaurant_id: "rst_1001".into(),
                display_name: "Kardesler Lokantasi".into(),
                active: true,
                plan: Plan::Premium,
            },
            Tenant {
                slug: "kapali-lokanta".into(),
                restaurant_id: "rst_1002".into(),
                display_name: "Kapali Lokanta".into(),
                active: false,
                plan: Plan::Basic,
            },
        ])
    }

    #[test]
    fn test_found_inactive_not_found() {
        let dir = directory();
        tokio_test::block_on(async {
            match dir.validate("kardesler").await.unwrap() {
                TenantLookup::Found(t) => assert_eq!(t.restaurant_id, "rst_1001"),
                other => panic!("expected Found, got {:?}", other),
            }
            assert!(matches!(
                dir.validate("kapali-lokanta").await.unwrap(),
                TenantLookup::Inactive(_)
            ));
            assert!(matches!(
                dir.validate("unknown123").await.unwrap(),
                TenantLookup::NotFound
            ));
        });
    }

    #[test]
    fn test_len() {
        let dir = directory();
        assert_eq!(dir.len(), 2);
        assert!(!dir.is_empty());
    }
}
