//! Error types for Guzellestir services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling
//!
//! Inside the routing layer every one of these is converted into a route
//! decision; nothing propagates to the request pipeline as an exception.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,
    MalformedHostname,

    // Authentication errors (2xxx)
    Unauthorized,
    MissingSessionCredential,
    InvalidSessionCredential,
    ExpiredSessionCredential,

    // Authorization errors (3xxx)
    Forbidden,
    TenantMismatch,
    InactiveTenant,

    // Tenant resolution errors (4xxx)
    NotFound,
    UnknownTenant,
    ReservedSlug,

    // Rate limiting (6xxx)
    RateLimited,

    // Tenant store errors (7xxx)
    LookupTimeout,
    LookupFailure,

    // External service errors (8xxx)
    UpstreamError,
    CacheError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,

    // Service unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1002,
            ErrorCode::MalformedHostname => 1003,

            // Authn (2xxx)
            ErrorCode::Unauthorized => 2001,
            ErrorCode::MissingSessionCredential => 2002,
            ErrorCode::InvalidSessionCredential => 2003,
            ErrorCode::ExpiredSessionCredential => 2004,

            // Authz (3xxx)
            ErrorCode::Forbidden => 3001,
            ErrorCode::TenantMismatch => 3002,
            ErrorCode::InactiveTenant => 3003,

            // Resolution (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::UnknownTenant => 4002,
            ErrorCode::ReservedSlug => 4003,

            // Rate limits (6xxx)
            ErrorCode::RateLimited => 6001,

            // Tenant store (7xxx)
            ErrorCode::LookupTimeout => 7001,
            ErrorCode::LookupFailure => 7002,

            // External (8xxx)
            ErrorCode::UpstreamError => 8001,
            ErrorCode::CacheError => 8002,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,

            ErrorCode::ServiceUnavailable => 9999,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Malformed hostname '{host}': {reason}")]
    MalformedHostname { host: String, reason: String },

    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Missing session credential")]
    MissingSessionCredential,

    #[error("Invalid session credential")]
    InvalidSessionCredential,

    #[error("Expired session credential")]
    ExpiredSessionCredential,

    // Authorization errors
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Tenant mismatch")]
    TenantMismatch,

    #[error("Tenant '{slug}' is not active")]
    InactiveTenant { slug: String },

    // Tenant resolution errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Unknown tenant: {slug}")]
    UnknownTenant { slug: String },

    #[error("Reserved subdomain: {slug}")]
    ReservedSlug { slug: String },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Tenant store errors (always fail closed)
    #[error("Tenant lookup timed out after {timeout_ms}ms")]
    LookupTimeout { timeout_ms: u64 },

    #[error("Tenant lookup failed: {message}")]
    LookupFailure { message: String },

    // External service errors
    #[error("Cache error: {message}")]
    CacheError { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::MalformedHostname { .. } => ErrorCode::MalformedHostname,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::MissingSessionCredential => ErrorCode::MissingSessionCredential,
            AppError::InvalidSessionCredential => ErrorCode::InvalidSessionCredential,
            AppError::ExpiredSessionCredential => ErrorCode::ExpiredSessionCredential,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::TenantMismatch => ErrorCode::TenantMismatch,
            AppError::InactiveTenant { .. } => ErrorCode::InactiveTenant,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::UnknownTenant { .. } => ErrorCode::UnknownTenant,
            AppError::ReservedSlug { .. } => ErrorCode::ReservedSlug,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::LookupTimeout { .. } => ErrorCode::LookupTimeout,
            AppError::LookupFailure { .. } => ErrorCode::LookupFailure,
            AppError::CacheError { .. } => ErrorCode::CacheError,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } |
            AppError::InvalidFormat { .. } |
            AppError::MalformedHostname { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized { .. } |
            AppError::MissingSessionCredential |
            AppError::InvalidSessionCredential |
            AppError::ExpiredSessionCredential => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden { .. } |
            AppError::TenantMismatch |
            AppError::InactiveTenant { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found (reserved slugs are indistinguishable from
            // unknown tenants on purpose)
            AppError::NotFound { .. } |
            AppError::UnknownTenant { .. } |
            AppError::ReservedSlug { .. } => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Internal { .. } |
            AppError::Configuration { .. } |
            AppError::Serialization(_) |
            AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            AppError::LookupTimeout { .. } |
            AppError::LookupFailure { .. } |
            AppError::CacheError { .. } |
            AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                details: None,
                request_id: None, // Should be filled by middleware
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::UnknownTenant { slug: "kardesler".into() };
        assert_eq!(err.code(), ErrorCode::UnknownTenant);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_reserved_matches_not_found_status() {
        // Reserved slugs must be indistinguishable from unknown tenants
        let reserved = AppError::ReservedSlug { slug: "blog".into() };
        let unknown = AppError::UnknownTenant { slug: "blog".into() };
        assert_eq!(reserved.status_code(), unknown.status_code());
    }

    #[test]
    fn test_lookup_errors_are_unavailable() {
        let err = AppError::LookupTimeout { timeout_ms: 1500 };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_server_error());

        let err = AppError::LookupFailure { message: "connection refused".into() };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_malformed_hostname_is_client_error() {
        let err = AppError::MalformedHostname {
            host: "ab.guzellestir.com".into(),
            reason: "too short".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_session_errors_are_unauthorized() {
        for err in [
            AppError::MissingSessionCredential,
            AppError::InvalidSessionCredential,
            AppError::ExpiredSessionCredential,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }
}
