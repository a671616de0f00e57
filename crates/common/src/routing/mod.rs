//! Route dispatch policy
//!
//! The single authoritative mapping from (hostname class, tenant resolution,
//! path, session state) to a route decision. Pure and deterministic: every
//! request gets exactly one decision, no error escapes as an exception, and
//! there are no retries at this layer.

use crate::auth::{Role, SessionState};
use crate::config::DomainConfig;
use crate::errors::{AppError, Result};
use crate::hostname::HostnameClass;
use crate::tenant::{Tenant, TenantLookup};
use axum::http::StatusCode;

/// Prefix of internal rewritten paths; the path segment after it is the
/// canonical carrier of the resolved tenant identity.
pub const INTERNAL_PREFIX: &str = "/t";

const ADMIN_PREFIX: &str = "/admin";
const KITCHEN_PREFIX: &str = "/mutfak";
const WAITER_PREFIX: &str = "/garson";
const CASHIER_PREFIX: &str = "/kasa";
const TENANT_LOGIN_PATH: &str = "/login";
const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// The one decision produced per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Forward the request unchanged
    PassThrough,
    /// Rewrite to an internal path (invisible to the client)
    Rewrite(String),
    /// Redirect the client
    Redirect { location: String, status: StatusCode },
    /// Terminate with a branded error page
    Reject { status: StatusCode, page: ErrorPage },
}

impl RouteDecision {
    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            RouteDecision::PassThrough => "pass_through",
            RouteDecision::Rewrite(_) => "rewrite",
            RouteDecision::Redirect { .. } => "redirect",
            RouteDecision::Reject { .. } => "reject",
        }
    }
}

/// Branded terminal pages the edge can render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPage {
    /// 400: the hostname failed the slug charset/length rules
    MalformedHost { host: String },
    /// 404: no tenant at the attempted label (reserved words render this
    /// same page so tenant existence never leaks)
    UnknownTenant { slug: String },
    /// 403: tenant exists but is deactivated
    InactiveTenant { slug: String },
    /// 503: the tenant store could not answer; fail closed
    StoreUnavailable,
    /// 404: unroutable path (e.g. direct access to an internal path)
    NotFound { path: String },
}

/// Result of tenant validation as seen by the dispatcher
#[derive(Debug, Clone)]
pub enum TenantResolution {
    /// The hostname class required no validation
    NotAttempted,
    Found(Tenant),
    Inactive(Tenant),
    NotFound { slug: String },
    /// Validation errored; the dispatcher fails closed
    Unavailable,
}

impl TenantResolution {
    /// Fold a validator outcome into a resolution, failing closed on errors
    pub fn from_lookup(slug: &str, lookup: Result<TenantLookup>) -> Self {
        match lookup {
            Ok(TenantLookup::Found(tenant)) => TenantResolution::Found(tenant),
            Ok(TenantLookup::Inactive(tenant)) => TenantResolution::Inactive(tenant),
            Ok(TenantLookup::NotFound) => TenantResolution::NotFound {
                slug: slug.to_string(),
            },
            Err(err) => {
                tracing::warn!(slug, error = %err, "tenant lookup failed, failing closed");
                TenantResolution::Unavailable
            }
        }
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        match self {
            TenantResolution::Found(tenant) | TenantResolution::Inactive(tenant) => Some(tenant),
            _ => None,
        }
    }
}

/// Everything the dispatcher looks at for one request
#[derive(Debug)]
pub struct RouteRequest<'a> {
    pub host: HostnameClass,
    pub tenant: TenantResolution,
    pub path: &'a str,
    pub session: SessionState,
}

/// The unified routing policy, shared by every entry point
pub struct RoutePolicy {
    apex: String,
}

impl RoutePolicy {
    pub fn new(domain: &DomainConfig) -> Self {
        Self {
            apex: domain.apex.to_ascii_lowercase(),
        }
    }

    /// Map a request to its one route decision
    pub fn dispatch(&self, req: &RouteRequest<'_>) -> RouteDecision {
        match &req.host {
            HostnameClass::Apex | HostnameClass::Www => self.dispatch_apex(req.path),
            HostnameClass::AdminHost => dispatch_admin(req.path, &req.session),
            HostnameClass::ApiHost => RouteDecision::PassThrough,
            HostnameClass::Reserved(label) => RouteDecision::Reject {
                status: StatusCode::NOT_FOUND,
                page: ErrorPage::UnknownTenant {
                    slug: label.clone(),
                },
            },
            HostnameClass::Tenant(_) => dispatch_tenant(req),
        }
    }

    fn dispatch_apex(&self, path: &str) -> RouteDecision {
        if path_has_prefix(path, ADMIN_PREFIX) {
            // Canonicalize admin paths onto the admin host
            return RouteDecision::Redirect {
                location: format!("https://admin.{}{}", self.apex, path),
                status: StatusCode::MOVED_PERMANENTLY,
            };
        }
        if path_has_prefix(path, INTERNAL_PREFIX) {
            // Internal rewrite targets are not externally addressable
            return RouteDecision::Reject {
                status: StatusCode::NOT_FOUND,
                page: ErrorPage::NotFound {
                    path: path.to_string(),
                },
            };
        }
        RouteDecision::PassThrough
    }
}

fn dispatch_admin(path: &str, session: &SessionState) -> RouteDecision {
    if path == ADMIN_LOGIN_PATH {
        return RouteDecision::PassThrough;
    }
    if path_has_prefix(path, ADMIN_PREFIX) {
        return match guard(session, Role::SuperAdmin, None) {
            Ok(()) => RouteDecision::PassThrough,
            Err(_) => redirect_to_login(ADMIN_LOGIN_PATH),
        };
    }
    // The admin host serves only admin paths
    redirect_to_login(ADMIN_LOGIN_PATH)
}

fn dispatch_tenant(req: &RouteRequest<'_>) -> RouteDecision {
    match &req.tenant {
        TenantResolution::Found(tenant) => dispatch_found(tenant, req.path, &req.session),
        TenantResolution::Inactive(tenant) => RouteDecision::Reject {
            status: StatusCode::FORBIDDEN,
            page: ErrorPage::InactiveTenant {
                slug: tenant.slug.clone(),
            },
        },
        TenantResolution::NotFound { slug } => RouteDecision::Reject {
            status: StatusCode::NOT_FOUND,
            page: ErrorPage::UnknownTenant { slug: slug.clone() },
        },
        // A tenant host without a decided lookup always fails closed
        TenantResolution::Unavailable | TenantResolution::NotAttempted => RouteDecision::Reject {
            status: StatusCode::SERVICE_UNAVAILABLE,
            page: ErrorPage::StoreUnavailable,
        },
    }
}

fn dispatch_found(tenant: &Tenant, path: &str, session: &SessionState) -> RouteDecision {
    let rid = &tenant.restaurant_id;

    if path == TENANT_LOGIN_PATH {
        return RouteDecision::Rewrite(format!("{}/{}/login", INTERNAL_PREFIX, rid));
    }

    // Role-scoped areas, each behind the guard
    let areas: [(&str, Role, &str); 4] = [
        (ADMIN_PREFIX, Role::Admin, "business"),
        (KITCHEN_PREFIX, Role::Kitchen, "kitchen"),
        (WAITER_PREFIX, Role::Waiter, "waiter"),
        (CASHIER_PREFIX, Role::Cashier, "cashier"),
    ];
    for (prefix, required, area) in areas {
        if path_has_prefix(path, prefix) {
            return match guard(session, required, Some(&tenant.slug)) {
                Ok(()) => RouteDecision::Rewrite(format!(
                    "{}/{}/{}{}",
                    INTERNAL_PREFIX,
                    rid,
                    area,
                    strip_prefix(path, prefix)
                )),
                Err(_) => redirect_to_login(TENANT_LOGIN_PATH),
            };
        }
    }

    // Everything else is the customer menu
    let rest = if path == "/" { "" } else { path };
    RouteDecision::Rewrite(format!("{}/{}/menu{}", INTERNAL_PREFIX, rid, rest))
}

/// Check the session against a required role (and tenant, when scoped)
fn guard(session: &SessionState, required: Role, tenant_slug: Option<&str>) -> Result<()> {
    match session {
        SessionState::Missing => Err(AppError::MissingSessionCredential),
        SessionState::Invalid => Err(AppError::InvalidSessionCredential),
        SessionState::Valid(claims) => {
            if !claims.role.covers(required) {
                return Err(AppError::Forbidden {
                    message: format!("requires {} role", required.as_str()),
                });
            }
            if let Some(slug) = tenant_slug {
                if claims.role != Role::SuperAdmin && claims.tenant != slug {
                    return Err(AppError::TenantMismatch);
                }
            }
            Ok(())
        }
    }
}

/// Segment-aware prefix check: `/admin` matches `/admin` and `/admin/x`,
/// never `/adminx`
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or("")
}

fn redirect_to_login(login_path: &str) -> RouteDecision {
    RouteDecision::Redirect {
        location: login_path.to_string(),
        status: StatusCode::FOUND,
    }
}
