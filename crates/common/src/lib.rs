//! Guzellestir Common Library
//!
//! Shared code for the Guzellestir edge services including:
//! - Hostname classification and tenant resolution
//! - Route dispatch policy
//! - Session tokens and the role guard
//! - Feature-flag resolution
//! - Cache backends for validation results
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod auth;
pub mod cache;
pub mod config;
pub mod errors;
pub mod features;
pub mod hostname;
pub mod metrics;
pub mod routing;
pub mod tenant;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use hostname::{HostnameClass, HostnameParser};
pub use routing::{RouteDecision, RoutePolicy};
pub use tenant::{Tenant, TenantLookup, TenantValidator};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
