//! Guzellestir Edge Router
//!
//! The entry point for all inbound platform requests.
//! Handles:
//! - Hostname-to-tenant resolution
//! - Role guards over business and admin areas
//! - Rate limiting
//! - Request routing (pass-through, rewrite, redirect, reject)
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;
mod pages;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use guzellestir_common::{
    auth::SessionTokenManager,
    config::AppConfig,
    features::{FeatureResolver, FeatureSource, PlanDefaults, RemoteFeatureSource},
    hostname::HostnameParser,
    metrics,
    routing::RoutePolicy,
    tenant::{CachedValidator, RemoteTenantService, StaticTenantDirectory, TenantValidator},
};
use guzellestir_common::cache::{MemoryCache, RedisCache, TtlCache};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub parser: Arc<HostnameParser>,
    pub policy: Arc<RoutePolicy>,
    pub validator: Arc<dyn TenantValidator>,
    pub sessions: Arc<SessionTokenManager>,
    pub features: Arc<FeatureResolver>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting Guzellestir edge router v{}", guzellestir_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Metrics exporter listening on {}", addr);
    }

    // Build shared state
    let state = build_state(config.clone()).await?;

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Assemble the resolution components from configuration
async fn build_state(config: Arc<AppConfig>) -> Result<AppState, Box<dyn std::error::Error>> {
    let parser = Arc::new(HostnameParser::new(&config.domain)?);
    let policy = Arc::new(RoutePolicy::new(&config.domain));
    let validator = build_validator(&config).await?;

    let secret = match &config.auth.jwt_secret {
        Some(secret) => secret.clone(),
        None => {
            // Sessions issued by other instances will not verify here
            warn!("auth.jwt_secret not set, using an ephemeral per-process secret");
            uuid::Uuid::new_v4().to_string()
        }
    };
    let sessions = Arc::new(SessionTokenManager::new(
        &secret,
        config.auth.jwt_expiration_secs,
    ));

    let features = build_features(&config)?;

    Ok(AppState {
        config,
        parser,
        policy,
        validator,
        sessions,
        features,
    })
}

/// Remote store (with cache) when configured, static directory otherwise
async fn build_validator(
    config: &AppConfig,
) -> Result<Arc<dyn TenantValidator>, Box<dyn std::error::Error>> {
    if config.tenants.base_url.is_some() {
        let remote = RemoteTenantService::new(&config.tenants)?;
        let cache: Arc<dyn TtlCache> = match &config.redis.url {
            Some(url) => {
                info!("Using redis-backed validation cache");
                Arc::new(RedisCache::new(url, &config.redis.key_prefix).await?)
            }
            None => {
                info!("Using in-process validation cache");
                Arc::new(MemoryCache::default())
            }
        };
        Ok(Arc::new(CachedValidator::new(
            Arc::new(remote),
            cache,
            config.tenants.validation_ttl_secs,
        )))
    } else {
        info!(
            tenants = config.tenants.static_tenants.len(),
            "Tenant store URL not configured, using the static tenant directory"
        );
        Ok(Arc::new(StaticTenantDirectory::new(
            &config.tenants.static_tenants,
        )))
    }
}

fn build_features(config: &AppConfig) -> Result<Arc<FeatureResolver>, Box<dyn std::error::Error>> {
    let mut sources: Vec<Arc<dyn FeatureSource>> = Vec::new();
    if let Some(base_url) = &config.features.base_url {
        sources.push(Arc::new(RemoteFeatureSource::new(
            base_url,
            config.tenants.lookup_timeout(),
        )?));
    }
    sources.push(Arc::new(PlanDefaults::new(
        config.features.plan_defaults.clone(),
    )));
    Ok(Arc::new(FeatureResolver::new(sources)))
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Rate limiting
    let rate_limit = middleware::rate_limit::RateLimitState::new(&state.config.rate_limit);

    // Internal routes: health probes, the admin console, and the
    // tenant-scoped areas the resolver rewrites into
    let app_routes = Router::new()
        // Health endpoints
        .route("/healthz", get(handlers::health::health))
        .route("/readyz", get(handlers::health::ready))

        // Super-admin console
        .route("/admin/login", get(handlers::admin::login_page))
        .route("/admin", get(handlers::admin::console_home))
        .route("/admin/{*section}", get(handlers::admin::console_section))

        // Tenant areas (reached only via rewrite)
        .route("/t/{rid}/{area}", get(handlers::tenant::area))
        .route("/t/{rid}/{area}/{*section}", get(handlers::tenant::area_section))
        .with_state(state.clone());

    // The resolver rewrites the request URI, so it must sit in front of a
    // routing pass: a middleware attached with `Router::layer` runs per
    // matched route (after routing) and its URI rewrites never re-route.
    // Placing the routed services behind a fallback lets the resolver's
    // rewrites route to the internal handlers.
    let resolved = Router::new()
        .fallback_service(app_routes)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::resolve::resolve_tenant,
        ));

    // Compose the app
    resolved
        .layer(from_fn_with_state(
            rate_limit,
            middleware::rate_limit::rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
