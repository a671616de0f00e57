//! Configuration management for Guzellestir services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values
//!
//! Reserved words, the slug pattern, and the length bounds are configuration
//! data here so operators can extend them without code changes.

use crate::tenant::{Plan, Tenant};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Platform domain configuration (apex, reserved words, slug rules)
    pub domain: DomainConfig,

    /// Tenant store configuration
    pub tenants: TenantStoreConfig,

    /// Redis configuration (validation cache)
    pub redis: RedisConfig,

    /// Session / role-guard configuration
    pub auth: AuthConfig,

    /// Feature-flag resolution configuration
    pub features: FeaturesConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
    /// Canonical apex domain (no subdomain label)
    #[serde(default = "default_apex")]
    pub apex: String,

    /// Subdomain labels reserved for platform infrastructure,
    /// never assignable to a tenant
    #[serde(default = "default_reserved_words")]
    pub reserved_words: Vec<String>,

    /// Pattern a candidate tenant slug must match
    #[serde(default = "default_slug_pattern")]
    pub slug_pattern: String,

    /// Minimum slug length
    #[serde(default = "default_slug_min_len")]
    pub slug_min_len: usize,

    /// Maximum slug length
    #[serde(default = "default_slug_max_len")]
    pub slug_max_len: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenantStoreConfig {
    /// Base URL of the tenant store service. When unset, the static
    /// tenant directory below is authoritative.
    pub base_url: Option<String>,

    /// Remote lookup timeout in milliseconds
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// TTL for cached validation results in seconds. Bounds how long a
    /// deactivation can go unobserved.
    #[serde(default = "default_validation_ttl")]
    pub validation_ttl_secs: u64,

    /// Static tenant allow-list (edge deployments without store access)
    #[serde(default)]
    pub static_tenants: Vec<StaticTenant>,
}

/// A tenant entry in the static allow-list
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticTenant {
    pub slug: String,
    pub restaurant_id: String,
    pub display_name: String,
    #[serde(default = "default_tenant_active")]
    pub active: bool,
    #[serde(default)]
    pub plan: Plan,
}

impl From<&StaticTenant> for Tenant {
    fn from(entry: &StaticTenant) -> Self {
        Tenant {
            slug: entry.slug.to_ascii_lowercase(),
            restaurant_id: entry.restaurant_id.clone(),
            display_name: entry.display_name.clone(),
            active: entry.active,
            plan: entry.plan,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    /// Redis URL. When unset, the in-process cache is used instead.
    pub url: Option<String>,

    /// Key prefix for namespacing
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret for session token signing
    pub jwt_secret: Option<String>,

    /// Session token expiration in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_secs: u64,

    /// Name of the session cookie
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    /// Base URL of the feature-flag service. When unset, only per-plan
    /// defaults are consulted.
    pub base_url: Option<String>,

    /// Feature sets granted per plan when the remote source defers
    #[serde(default = "default_plan_features")]
    pub plan_defaults: HashMap<Plan, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_apex() -> String { "guzellestir.com".to_string() }
fn default_slug_pattern() -> String { "^[a-z0-9]([a-z0-9-]*[a-z0-9])?$".to_string() }
fn default_slug_min_len() -> usize { 3 }
fn default_slug_max_len() -> usize { 20 }
fn default_lookup_timeout_ms() -> u64 { 1500 }
fn default_validation_ttl() -> u64 { 30 }
fn default_tenant_active() -> bool { true }
fn default_key_prefix() -> String { "guzellestir".to_string() }
fn default_jwt_expiration() -> u64 { 3600 }
fn default_session_cookie() -> String { "gz_session".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "guzellestir-edge".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

fn default_reserved_words() -> Vec<String> {
    [
        "admin", "api", "www", "mail", "ftp", "support", "help", "docs",
        "blog", "shop", "store", "menu", "qr", "panel", "pos", "garson",
        "mutfak", "kasa", "app", "cdn", "static",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_plan_features() -> HashMap<Plan, Vec<String>> {
    let feats = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    HashMap::from([
        (Plan::Basic, feats(&["menu", "qr"])),
        (Plan::Premium, feats(&["menu", "qr", "online-ordering", "analytics"])),
        (
            Plan::Pro,
            feats(&[
                "menu",
                "qr",
                "online-ordering",
                "analytics",
                "multi-branch",
                "priority-support",
            ]),
        ),
    ])
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__DOMAIN__APEX=guzellestir.com
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}

impl TenantStoreConfig {
    /// Get the remote lookup timeout as Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Get the validation cache TTL as Duration
    pub fn validation_ttl(&self) -> Duration {
        Duration::from_secs(self.validation_ttl_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
                shutdown_timeout_secs: default_shutdown_timeout(),
            },
            domain: DomainConfig {
                apex: default_apex(),
                reserved_words: default_reserved_words(),
                slug_pattern: default_slug_pattern(),
                slug_min_len: default_slug_min_len(),
                slug_max_len: default_slug_max_len(),
            },
            tenants: TenantStoreConfig {
                base_url: None,
                lookup_timeout_ms: default_lookup_timeout_ms(),
                validation_ttl_secs: default_validation_ttl(),
                static_tenants: Vec::new(),
            },
            redis: RedisConfig {
                url: None,
                key_prefix: default_key_prefix(),
            },
            auth: AuthConfig {
                jwt_secret: None,
                jwt_expiration_secs: default_jwt_expiration(),
                session_cookie: default_session_cookie(),
            },
            features: FeaturesConfig {
                base_url: None,
                plan_defaults: default_plan_features(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_rate_limit(),
                burst: default_burst(),
                enabled: default_enabled(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.domain.apex, "guzellestir.com");
        assert_eq!(config.domain.slug_min_len, 3);
        assert_eq!(config.domain.slug_max_len, 20);
        assert!(config.domain.reserved_words.iter().any(|w| w == "admin"));
    }

    #[test]
    fn test_plan_defaults_cover_all_plans() {
        let config = AppConfig::default();
        for plan in [Plan::Basic, Plan::Premium, Plan::Pro] {
            assert!(config.features.plan_defaults.contains_key(&plan));
        }
        assert!(config.features.plan_defaults[&Plan::Pro].len()
            > config.features.plan_defaults[&Plan::Basic].len());
    }

    #[test]
    fn test_duration_helpers() {
        let config = AppConfig::default();
        assert_eq!(config.tenants.lookup_timeout(), Duration::from_millis(1500));
        assert_eq!(config.tenants.validation_ttl(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_static_tenant_conversion() {
        let entry = StaticTenant {
            slug: "Kardesler".to_string(),
            restaurant_id: "rst_1001".to_string(),
            display_name: "Kardesler Lokantasi".to_string(),
            active: true,
            plan: Plan::Premium,
        };
        let tenant = Tenant::from(&entry);
        assert_eq!(tenant.slug, "kardesler");
        assert_eq!(tenant.restaurant_id, "rst_1001");
        assert!(tenant.active);
    }
}
