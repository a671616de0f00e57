//! Branded terminal responses
//!
//! Renders the reject decisions as branded HTML pages, or as structured
//! JSON for callers that ask for it. Unknown and reserved labels render the
//! same page so tenant existence never leaks; lookup failures never expose
//! internal detail.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use guzellestir_common::routing::ErrorPage;
use serde_json::json;

pub fn render(apex: &str, status: StatusCode, page: &ErrorPage, wants_json: bool) -> Response {
    if wants_json {
        let body = json!({
            "error": {
                "code": code(page),
                "message": message(apex, page),
            }
        });
        return (status, Json(body)).into_response();
    }
    (status, Html(html(apex, page))).into_response()
}

fn code(page: &ErrorPage) -> &'static str {
    match page {
        ErrorPage::MalformedHost { .. } => "MALFORMED_HOSTNAME",
        ErrorPage::UnknownTenant { .. } => "UNKNOWN_TENANT",
        ErrorPage::InactiveTenant { .. } => "INACTIVE_TENANT",
        ErrorPage::StoreUnavailable => "SERVICE_UNAVAILABLE",
        ErrorPage::NotFound { .. } => "NOT_FOUND",
    }
}

fn title(page: &ErrorPage) -> &'static str {
    match page {
        ErrorPage::MalformedHost { .. } => "Invalid address",
        ErrorPage::UnknownTenant { .. } => "Restaurant not found",
        ErrorPage::InactiveTenant { .. } => "Restaurant not active",
        ErrorPage::StoreUnavailable => "Temporarily unavailable",
        ErrorPage::NotFound { .. } => "Page not found",
    }
}

fn message(apex: &str, page: &ErrorPage) -> String {
    match page {
        ErrorPage::MalformedHost { host } => {
            format!("'{}' is not a valid {} address.", host, apex)
        }
        ErrorPage::UnknownTenant { slug } => {
            format!("No restaurant is registered at {}.{}.", slug, apex)
        }
        ErrorPage::InactiveTenant { slug } => {
            format!("The restaurant at {}.{} is not currently active.", slug, apex)
        }
        ErrorPage::StoreUnavailable => {
            "We could not complete your request. Please try again shortly.".to_string()
        }
        ErrorPage::NotFound { path } => format!("'{}' does not exist.", path),
    }
}

fn html(apex: &str, page: &ErrorPage) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"tr\">\n\
         <head><meta charset=\"utf-8\"><title>{title} | Guzellestir</title></head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <p>{message}</p>\n\
         <p><a href=\"https://{apex}/\">Guzellestir</a></p>\n\
         </body>\n\
         </html>\n",
        title = title(page),
        message = escape_html(&message(apex, page)),
        apex = apex,
    )
}

/// Minimal HTML escaping for request-derived strings
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tenant_page_names_the_slug() {
        let body = html(
            "guzellestir.com",
            &ErrorPage::UnknownTenant {
                slug: "unknown123".into(),
            },
        );
        assert!(body.contains("unknown123.guzellestir.com"));
        assert!(body.contains("https://guzellestir.com/"));
    }

    #[test]
    fn test_store_unavailable_hides_detail() {
        let body = html("guzellestir.com", &ErrorPage::StoreUnavailable);
        assert!(body.contains("try again"));
        assert!(!body.to_lowercase().contains("timeout"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>\"&\"</script>"),
            "&lt;script&gt;&quot;&amp;&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_json_codes() {
        assert_eq!(code(&ErrorPage::StoreUnavailable), "SERVICE_UNAVAILABLE");
        assert_eq!(
            code(&ErrorPage::UnknownTenant { slug: "x".into() }),
            "UNKNOWN_TENANT"
        );
    }
}
