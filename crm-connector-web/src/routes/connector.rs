//! Discovery routes: handshake, health, tool list

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use crm_connector_core::services::{connector_info, tool_list};

use crate::state::AppState;

/// `GET`/`POST /`
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(connector_info(state.auth_type()))
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Salesforce MCP is healthy")
}

/// `GET /tools/list`
pub async fn tools_list() -> HttpResponse {
    HttpResponse::Ok().json(tool_list())
}

/// `GET /favicon.ico`
pub async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
