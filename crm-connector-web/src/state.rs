//! Shared application state
//!
//! Built once in `main` and handed to every worker through `web::Data`.
//! Password mode carries one session created before the server starts;
//! OAuth mode resolves the session per request from the cookie.

use std::sync::Arc;

use actix_web::HttpRequest;
use crm_connector_core::{AuthService, LeadService, SessionStore};
use crm_connector_provider::{CrmProvider, CrmSession, OAuthAppCredentials};

use crate::error::ApiError;

/// Name of the opaque session-id cookie (OAuth mode).
pub const SESSION_COOKIE: &str = "crm_connector_sid";

/// Where a request's backend session comes from.
pub enum SessionSource {
    /// One login at startup, read by every request.
    Shared(Arc<CrmSession>),
    /// Authorization-code sessions keyed by cookie.
    PerCookie(AuthService),
}

pub struct AppState {
    pub leads: LeadService,
    pub sessions: SessionSource,
    pub cookie_secure: bool,
    auth_type: &'static str,
}

impl AppState {
    /// State for direct-credential mode, with the session already established.
    pub fn password(provider: Arc<dyn CrmProvider>, session: CrmSession) -> Self {
        Self {
            leads: LeadService::new(provider),
            sessions: SessionSource::Shared(Arc::new(session)),
            cookie_secure: false,
            auth_type: "password",
        }
    }

    /// State for authorization-code mode; starts with no authenticated sessions.
    pub fn oauth(
        provider: Arc<dyn CrmProvider>,
        app: OAuthAppCredentials,
        store: Arc<dyn SessionStore>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            leads: LeadService::new(Arc::clone(&provider)),
            sessions: SessionSource::PerCookie(AuthService::new(provider, app, store)),
            cookie_secure,
            auth_type: "oauth2",
        }
    }

    pub fn auth_type(&self) -> &'static str {
        self.auth_type
    }

    /// The flow service, in OAuth mode only.
    pub fn auth(&self) -> Option<&AuthService> {
        match &self.sessions {
            SessionSource::PerCookie(auth) => Some(auth),
            SessionSource::Shared(_) => None,
        }
    }

    /// Backend session for this request, or 401 before any backend call.
    pub async fn resolve_session(&self, req: &HttpRequest) -> Result<Arc<CrmSession>, ApiError> {
        match &self.sessions {
            SessionSource::Shared(session) => Ok(Arc::clone(session)),
            SessionSource::PerCookie(auth) => {
                let cookie = session_cookie(req);
                let session = auth.session_for(cookie.as_deref()).await?;
                Ok(Arc::new(session))
            }
        }
    }
}

/// Value of the session cookie, if the request carries one.
pub fn session_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
