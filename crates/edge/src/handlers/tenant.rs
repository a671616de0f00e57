//! Tenant-scoped area handlers
//!
//! These paths exist only as rewrite targets; the resolver injects the
//! resolved tenant as a request extension, and the path segment after `/t/`
//! is the canonical carrier of the same identity. A mismatch between the
//! two is a hard error.

use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use guzellestir_common::{
    errors::{AppError, Result},
    tenant::{Plan, Tenant},
};
use serde::Serialize;

#[derive(Serialize)]
pub struct MenuContext {
    pub restaurant_id: String,
    pub display_name: String,
    pub plan: Plan,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Serialize)]
pub struct AreaContext {
    pub restaurant_id: String,
    pub area: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

pub async fn area(
    State(state): State<AppState>,
    Path((rid, area)): Path<(String, String)>,
    tenant: Option<Extension<Tenant>>,
) -> Result<Response> {
    render_area(&state, tenant, rid, area, None).await
}

pub async fn area_section(
    State(state): State<AppState>,
    Path((rid, area, section)): Path<(String, String, String)>,
    tenant: Option<Extension<Tenant>>,
) -> Result<Response> {
    render_area(&state, tenant, rid, area, Some(section)).await
}

async fn render_area(
    state: &AppState,
    tenant: Option<Extension<Tenant>>,
    rid: String,
    area: String,
    section: Option<String>,
) -> Result<Response> {
    let Some(Extension(tenant)) = tenant else {
        // Direct access without going through the resolver
        return Err(AppError::Forbidden {
            message: "internal path requires a resolved tenant".to_string(),
        });
    };
    if tenant.restaurant_id != rid {
        return Err(AppError::TenantMismatch);
    }

    match area.as_str() {
        "menu" => {
            let features = state.features.resolve(&tenant).await;
            Ok(Json(MenuContext {
                restaurant_id: tenant.restaurant_id,
                display_name: tenant.display_name,
                plan: tenant.plan,
                features,
                section,
            })
            .into_response())
        }
        "login" => Ok(Html(login_page(&tenant.display_name)).into_response()),
        "business" | "kitchen" | "waiter" | "cashier" => Ok(Json(AreaContext {
            restaurant_id: tenant.restaurant_id,
            area,
            section,
        })
        .into_response()),
        _ => Err(AppError::NotFound {
            resource_type: "area".to_string(),
            id: area,
        }),
    }
}

/// Business login page for one tenant
fn login_page(display_name: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"tr\">\n\
         <head><meta charset=\"utf-8\"><title>{name} | Guzellestir</title></head>\n\
         <body>\n\
         <h1>{name}</h1>\n\
         <form method=\"post\" action=\"/login\">\n\
         <input type=\"email\" name=\"email\" placeholder=\"E-posta\">\n\
         <input type=\"password\" name=\"password\" placeholder=\"Sifre\">\n\
         <button type=\"submit\">Giris</button>\n\
         </form>\n\
         </body>\n\
         </html>\n",
        name = display_name,
    )
}
