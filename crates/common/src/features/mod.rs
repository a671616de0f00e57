//! Feature-flag resolution
//!
//! An explicit, ordered resolution policy: sources are tried in a fixed
//! sequence and each returns either a definite answer or "defer to next".
//! A source failure defers; an exhausted list yields the empty feature set.

use crate::errors::{AppError, Result};
use crate::tenant::{Plan, Tenant};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One strategy for answering "which features does this tenant have?"
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// `Ok(Some(_))` is a definite answer; `Ok(None)` defers to the next
    /// source.
    async fn resolve(&self, tenant: &Tenant) -> Result<Option<Vec<String>>>;
}

/// Tries sources in construction order; first definite answer wins
pub struct FeatureResolver {
    sources: Vec<Arc<dyn FeatureSource>>,
}

impl FeatureResolver {
    pub fn new(sources: Vec<Arc<dyn FeatureSource>>) -> Self {
        Self { sources }
    }

    /// Resolve the tenant's feature set; empty when every source defers
    pub async fn resolve(&self, tenant: &Tenant) -> Vec<String> {
        for source in &self.sources {
            match source.resolve(tenant).await {
                Ok(Some(features)) => {
                    debug!(
                        source = source.name(),
                        tenant = %tenant.slug,
                        count = features.len(),
                        "features resolved"
                    );
                    return features;
                }
                Ok(None) => continue,
                Err(err) => {
                    warn!(
                        source = source.name(),
                        tenant = %tenant.slug,
                        error = %err,
                        "feature source failed, deferring"
                    );
                    continue;
                }
            }
        }
        Vec::new()
    }
}

/// Remote feature-flag collaborator
pub struct RemoteFeatureSource {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FeaturesResponse {
    features: Vec<String>,
}

impl RemoteFeatureSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to build feature service client: {}", e),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, slug: &str) -> String {
        format!("{}/api/restaurants/{}/features", self.base_url, slug)
    }
}

#[async_trait]
impl FeatureSource for RemoteFeatureSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn resolve(&self, tenant: &Tenant) -> Result<Option<Vec<String>>> {
        let response = self.http.get(self.endpoint(&tenant.slug)).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The service does not know this tenant; let the next source decide
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::ServiceUnavailable {
                message: format!("feature service returned {}", status),
            });
        }

        let body: FeaturesResponse = response.json().await?;
        Ok(Some(body.features))
    }
}

/// Per-plan feature defaults from configuration
pub struct PlanDefaults {
    plans: HashMap<Plan, Vec<String>>,
}

impl PlanDefaults {
    pub fn new(plans: HashMap<Plan, Vec<String>>) -> Self {
        Self { plans }
    }
}

#[async_trait]
impl FeatureSource for PlanDefaults {
    fn name(&self) -> &'static str {
        "plan_defaults"
    }

    async fn resolve(&self, tenant: &Tenant) -> Result<Option<Vec<String>>> {
        Ok(self.plans.get(&tenant.plan).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<Vec<String>>);

    #[async_trait]
    impl FeatureSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        async fn resolve(&self, _tenant: &Tenant) -> Result<Option<Vec<String>>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl FeatureSource for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn resolve(&self, _tenant: &Tenant) -> Result<Option<Vec<String>>> {
            Err(AppError::ServiceUnavailable {
                message: "down".into(),
            })
        }
    }

    fn tenant(plan: Plan) -> Tenant {
        Tenant {
            slug: "kardesler".into(),
            restaurant_id: "rst_1001".into(),
            display_name: "Kardesler Lokantasi".into(),
            active: true,
            plan,
        }
    }

    #[tokio::test]
    async fn test_first_definite_answer_wins() {
        let resolver = FeatureResolver::new(vec![
            Arc::new(Fixed(None)),
            Arc::new(Fixed(Some(vec!["menu".into()]))),
            Arc::new(Fixed(Some(vec!["never-reached".into()]))),
        ]);
        assert_eq!(resolver.resolve(&tenant(Plan::Basic)).await, vec!["menu"]);
    }

    #[tokio::test]
    async fn test_source_error_defers() {
        let resolver = FeatureResolver::new(vec![
            Arc::new(Failing),
            Arc::new(Fixed(Some(vec!["qr".into()]))),
        ]);
        assert_eq!(resolver.resolve(&tenant(Plan::Basic)).await, vec!["qr"]);
    }

    #[tokio::test]
    async fn test_exhausted_sources_yield_empty() {
        let resolver = FeatureResolver::new(vec![Arc::new(Fixed(None)), Arc::new(Failing)]);
        assert!(resolver.resolve(&tenant(Plan::Basic)).await.is_empty());
    }

    #[tokio::test]
    async fn test_plan_defaults_by_plan() {
        let defaults = PlanDefaults::new(HashMap::from([
            (Plan::Basic, vec!["menu".to_string()]),
            (Plan::Pro, vec!["menu".to_string(), "multi-branch".to_string()]),
        ]));
        assert_eq!(
            defaults.resolve(&tenant(Plan::Pro)).await.unwrap(),
            Some(vec!["menu".to_string(), "multi-branch".to_string()])
        );
        // Premium has no entry here: defer
        assert_eq!(defaults.resolve(&tenant(Plan::Premium)).await.unwrap(), None);
    }

    #[test]
    fn test_remote_endpoint_shape() {
        let source =
            RemoteFeatureSource::new("http://features.internal/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            source.endpoint("kardesler"),
            "http://features.internal/api/restaurants/kardesler/features"
        );
    }
}
