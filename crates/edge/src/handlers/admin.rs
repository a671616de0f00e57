//! Super-admin console handlers
//!
//! Thin stand-ins for the platform console; the console app itself is a
//! separate surface. The guard in front of these lives in the dispatcher.

use axum::{extract::Path, response::Html, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ConsoleResponse {
    pub console: String,
    pub section: String,
}

/// Platform operator login page
pub async fn login_page() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html>\n\
         <html lang=\"tr\">\n\
         <head><meta charset=\"utf-8\"><title>Operator login | Guzellestir</title></head>\n\
         <body>\n\
         <h1>Guzellestir</h1>\n\
         <form method=\"post\" action=\"/admin/login\">\n\
         <input type=\"email\" name=\"email\" placeholder=\"E-posta\">\n\
         <input type=\"password\" name=\"password\" placeholder=\"Sifre\">\n\
         <button type=\"submit\">Giris</button>\n\
         </form>\n\
         </body>\n\
         </html>\n",
    )
}

/// Console dashboard
pub async fn console_home() -> Json<ConsoleResponse> {
    Json(ConsoleResponse {
        console: "admin".to_string(),
        section: "dashboard".to_string(),
    })
}

/// Console sections (restaurants, users, plans, ...)
pub async fn console_section(Path(section): Path<String>) -> Json<ConsoleResponse> {
    Json(ConsoleResponse {
        console: "admin".to_string(),
        section,
    })
}
