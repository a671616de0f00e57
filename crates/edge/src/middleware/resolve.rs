//! Tenant resolution middleware
//!
//! The single routing entry point: classify the hostname, validate the
//! candidate tenant, inspect the session, dispatch, and apply the decision.
//! Every failure mode terminates here as one explicit response; nothing
//! escapes into the inner router as an error.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use guzellestir_common::{
    auth,
    errors::AppError,
    hostname::HostnameClass,
    metrics::{self, RequestMetrics},
    routing::{ErrorPage, RouteDecision, RouteRequest, TenantResolution},
};
use std::time::Instant;

use crate::{pages, AppState};

pub async fn resolve_tenant(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let tracker = RequestMetrics::start(&method, &path);

    let response = route(&state, request, next).await;

    tracker.finish(response.status().as_u16());
    response
}

async fn route(state: &AppState, mut request: Request, next: Next) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let path = request.uri().path().to_string();
    let subdomain_param = query_param(request.uri().query(), "subdomain");
    let wants_json = wants_json(&request);

    let class = match state
        .parser
        .classify_request(&host, subdomain_param.as_deref())
    {
        Ok(class) => class,
        Err(err) => {
            metrics::record_classification("malformed");
            tracing::warn!(host = %host, error = %err, "rejected malformed hostname");
            return pages::render(
                &state.config.domain.apex,
                StatusCode::BAD_REQUEST,
                &ErrorPage::MalformedHost { host },
                wants_json,
            );
        }
    };
    metrics::record_classification(class.label());

    let tenant = match &class {
        HostnameClass::Tenant(slug) => {
            let started = Instant::now();
            let lookup = state.validator.validate(slug).await;
            let outcome = match &lookup {
                Ok(l) => l.label(),
                Err(_) => "error",
            };
            metrics::record_validation(
                state.validator.source(),
                outcome,
                started.elapsed().as_secs_f64(),
            );
            TenantResolution::from_lookup(slug, lookup)
        }
        _ => TenantResolution::NotAttempted,
    };

    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok());
    let session = auth::inspect_session(
        &state.sessions,
        cookie_header,
        &state.config.auth.session_cookie,
    );

    let route_request = RouteRequest {
        host: class,
        tenant,
        path: &path,
        session,
    };
    let decision = state.policy.dispatch(&route_request);
    metrics::record_decision(decision.label());

    match decision {
        RouteDecision::PassThrough => next.run(request).await,
        RouteDecision::Rewrite(new_path) => {
            if let Some(tenant) = route_request.tenant.tenant() {
                request.extensions_mut().insert(tenant.clone());
            }
            match rewrite_uri(request.uri(), &new_path) {
                Ok(uri) => {
                    tracing::debug!(from = %path, to = %new_path, "rewriting request");
                    *request.uri_mut() = uri;
                    next.run(request).await
                }
                Err(err) => err.into_response(),
            }
        }
        RouteDecision::Redirect { location, status } => redirect(status, &location),
        RouteDecision::Reject { status, page } => {
            pages::render(&state.config.domain.apex, status, &page, wants_json)
        }
    }
}

/// Extract a query parameter without decoding (slugs never need it)
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn wants_json(request: &Request) -> bool {
    request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

/// Swap the path, preserving the query string
fn rewrite_uri(uri: &Uri, new_path: &str) -> Result<Uri, AppError> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", new_path, query),
        None => new_path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().map_err(|e| AppError::Internal {
        message: format!("invalid rewrite target '{}': {}", new_path, e),
    })?);

    Uri::from_parts(parts).map_err(|e| AppError::Internal {
        message: format!("failed to rebuild uri: {}", e),
    })
}

fn redirect(status: StatusCode, location: &str) -> Response {
    Response::builder()
        .status(status)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
