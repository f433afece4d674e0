//! Authorization-code flow routes (OAuth mode only)

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::{ContentType, LOCATION};
use actix_web::{HttpRequest, HttpResponse, web};
use crm_connector_core::AuthService;
use crm_connector_core::types::OAuthCallback;
use serde_json::json;

use crate::error::{ApiError, internal};
use crate::state::{AppState, SESSION_COOKIE, session_cookie};

fn auth_service(state: &AppState) -> Result<&AuthService, ApiError> {
    state
        .auth()
        .ok_or_else(|| internal("authorization-code flow is not configured", "OAuth route"))
}

/// `GET /auth/login`, `GET /auth/salesforce`
pub async fn login(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let redirect = auth_service(&state)?.begin().await?;

    let cookie = Cookie::build(SESSION_COOKIE, redirect.session_id)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookie_secure)
        .finish();

    Ok(HttpResponse::Found()
        .insert_header((LOCATION, redirect.location))
        .cookie(cookie)
        .finish())
}

/// `GET /auth/callback`, `GET /oauth2/callback`
#[tracing_attributes::instrument(skip_all)]
pub async fn callback(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<OAuthCallback>,
) -> Result<HttpResponse, ApiError> {
    let cookie = session_cookie(&req);
    auth_service(&state)?
        .complete(cookie.as_deref(), &query)
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Salesforce authentication complete. You can close this window."))
}

/// `GET /auth/status`
pub async fn status(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let cookie = session_cookie(&req);
    let authenticated = auth_service(&state)?
        .is_authenticated(cookie.as_deref())
        .await;
    Ok(HttpResponse::Ok().json(json!({ "authenticated": authenticated })))
}
