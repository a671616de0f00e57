//! Session tokens and the role guard
//!
//! Provides:
//! - Signed, expiring session tokens (issued at login, verified per request)
//! - Business roles and their coverage relation
//! - Cookie extraction and session inspection
//!
//! Guarded paths require a verified signature and an unexpired token; there
//! is no shared sentinel value anywhere.

use crate::errors::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A role carried by a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Waiter (garson) dashboard
    Waiter,
    /// Kitchen (mutfak) dashboard
    Kitchen,
    /// Cashier (kasa) dashboard
    Cashier,
    /// Business admin of a single tenant
    Admin,
    /// Platform operator on the admin host
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
            Role::Cashier => "cashier",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    /// Roles scoped to a single tenant (everything but the platform operator)
    pub fn is_tenant_role(&self) -> bool {
        !matches!(self, Role::SuperAdmin)
    }

    /// Whether a session with this role satisfies a guard requiring `required`.
    ///
    /// A business admin covers the staff dashboards of its own tenant; the
    /// platform operator covers everything.
    pub fn covers(&self, required: Role) -> bool {
        match self {
            Role::SuperAdmin => true,
            Role::Admin => required.is_tenant_role(),
            role => *role == required,
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Tenant slug the session is scoped to
    pub tenant: String,

    /// Role within the tenant
    pub role: Role,

    /// Token identifier (for audit logs)
    pub jti: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Session token manager
pub struct SessionTokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl SessionTokenManager {
    /// Create a new manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: expiration_secs as i64,
        }
    }

    /// Issue a new session token
    pub fn issue_token(&self, sub: &str, tenant: &str, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration_secs);

        let claims = SessionClaims {
            sub: sub.to_string(),
            tenant: tenant.to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to issue session token: {}", e),
        })
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::ExpiredSessionCredential
                }
                _ => AppError::InvalidSessionCredential,
            })
    }
}

/// Per-request session state as seen by the dispatcher
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No session cookie on the request
    Missing,
    /// Cookie present but the token failed verification (bad signature,
    /// malformed, or expired) - all redirect to login
    Invalid,
    /// Verified, unexpired token
    Valid(SessionClaims),
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Missing => "missing",
            SessionState::Invalid => "invalid",
            SessionState::Valid(_) => "valid",
        }
    }
}

/// Extract a cookie value from a `Cookie` header
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Inspect the request's session cookie
pub fn inspect_session(
    manager: &SessionTokenManager,
    cookie_header: Option<&str>,
    cookie_name: &str,
) -> SessionState {
    let Some(header) = cookie_header else {
        return SessionState::Missing;
    };
    let Some(token) = cookie_value(header, cookie_name) else {
        return SessionState::Missing;
    };
    if token.is_empty() {
        return SessionState::Missing;
    }

    match manager.verify_token(token) {
        Ok(claims) => SessionState::Valid(claims),
        Err(err) => {
            tracing::debug!(
                token = %token_fingerprint(token),
                error = %err,
                "session token rejected"
            );
            SessionState::Invalid
        }
    }
}

/// Short stable fingerprint of a token for logs (never log the raw token)
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}
