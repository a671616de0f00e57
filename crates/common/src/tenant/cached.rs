//! TTL-bounded caching decorator for tenant validation
//!
//! Caches every decided outcome (found, inactive, not found) under the same
//! TTL, so repeated validation of a hot slug is one store round-trip per TTL
//! window and a deactivation is observable after at most one window. Lookup
//! errors are never cached: the next request retries the store.

use super::{TenantLookup, TenantValidator};
use crate::cache::{self, TtlCache};
use crate::errors::Result;
use crate::metrics;
use async_trait::async_trait;
use std::sync::Arc;

pub struct CachedValidator {
    inner: Arc<dyn TenantValidator>,
    cache: Arc<dyn TtlCache>,
    ttl_secs: u64,
}

impl CachedValidator {
    pub fn new(inner: Arc<dyn TenantValidator>, cache: Arc<dyn TtlCache>, ttl_secs: u64) -> Self {
        Self {
            inner,
            cache,
            ttl_secs,
        }
    }
}

#[async_trait]
impl TenantValidator for CachedValidator {
    async fn validate(&self, slug: &str) -> Result<TenantLookup> {
        let key = cache::keys::tenant(slug);

        match self.cache.get_raw(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<TenantLookup>(&json) {
                Ok(lookup) => {
                    metrics::record_cache(true, "tenant_validation");
                    return Ok(lookup);
                }
                Err(err) => {
                    tracing::warn!(slug, error = %err, "discarding undecodable cached lookup");
                    let _ = self.cache.delete(&key).await;
                }
            },
            Ok(None) => {}
            Err(err) => {
                // A broken cache degrades to uncached lookups, not failures
                tracing::warn!(slug, error = %err, "validation cache read failed");
            }
        }
        metrics::record_cache(false, "tenant_validation");

        let lookup = self.inner.validate(slug).await?;

        match serde_json::to_string(&lookup) {
            Ok(json) => {
                if let Err(err) = self.cache.set_raw(&key, &json, self.ttl_secs).await {
                    tracing::warn!(slug, error = %err, "validation cache write failed");
                }
            }
            Err(err) => {
                tracing::warn!(slug, error = %err, "failed to serialize lookup for cache");
            }
        }

        Ok(lookup)
    }

    fn source(&self) -> &'static str {
        self.inner.source()
    }
}
