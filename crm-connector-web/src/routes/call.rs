//! Connector calls: one backend round trip each

use actix_web::{HttpRequest, HttpResponse, web};
use crm_connector_core::types::{FetchParams, SearchParams};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /call/search`
#[tracing_attributes::instrument(skip_all, fields(query = %params.query))]
pub async fn search(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Json<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let session = state.resolve_session(&req).await?;
    let response = state.leads.search(&session, &params.query).await?;
    tracing::info!(results = response.results.len(), "search completed");
    Ok(HttpResponse::Ok().json(response))
}

/// `POST /call/fetch`
#[tracing_attributes::instrument(skip_all, fields(id = %params.id))]
pub async fn fetch(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Json<FetchParams>,
) -> Result<HttpResponse, ApiError> {
    // 空 id 在解析会话之前拒绝，不触发后端调用
    if params.id.trim().is_empty() {
        return Err(ApiError::BadRequest("id is required".to_string()));
    }
    let session = state.resolve_session(&req).await?;
    let item = state.leads.fetch(&session, &params.id).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// `GET /leads`
pub async fn leads(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let session = state.resolve_session(&req).await?;
    let leads = state.leads.list_recent(&session).await?;
    Ok(HttpResponse::Ok().json(leads))
}
