//! 授权码流程服务
//!
//! Drives `Unauthenticated → AuthorizationRequested → Authenticated` for one
//! browser session. The cookie only ever carries the record id; the state
//! value and the bearer token stay in the [`SessionStore`].

use std::sync::Arc;

use chrono::Utc;
use crm_connector_provider::{CrmProvider, CrmSession, OAuthAppCredentials, mask_secret};

use crate::error::{CoreError, CoreResult};
use crate::traits::SessionStore;
use crate::types::{OAuthCallback, PendingClaim, SessionRecord, SessionState};

/// Minutes a consent redirect stays valid before its record is dropped.
pub const PENDING_TTL_MINUTES: i64 = 10;

/// Upper bound on records still waiting for a callback.
pub const MAX_PENDING: usize = 1024;

fn no_pending() -> CoreError {
    CoreError::AuthorizationFailed("no pending authorization".to_string())
}

/// Result of starting the flow: which cookie to set and where to redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
    pub session_id: String,
    pub location: String,
}

/// 授权码流程服务
pub struct AuthService {
    provider: Arc<dyn CrmProvider>,
    app: OAuthAppCredentials,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn CrmProvider>,
        app: OAuthAppCredentials,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            provider,
            app,
            store,
        }
    }

    /// Open a new session record and build the consent URL for it.
    ///
    /// Abandoned authorizations older than [`PENDING_TTL_MINUTES`] are
    /// swept first, and the oldest pending ones beyond [`MAX_PENDING`].
    pub async fn begin(&self) -> CoreResult<AuthorizationRedirect> {
        let cutoff = Utc::now() - chrono::Duration::minutes(PENDING_TTL_MINUTES);
        let pruned = self
            .store
            .prune_pending(cutoff, MAX_PENDING.saturating_sub(1))
            .await?;
        if pruned > 0 {
            log::debug!("Dropped {pruned} abandoned authorization(s)");
        }

        let csrf_state = uuid::Uuid::new_v4().simple().to_string();
        let location = self.provider.authorize_url(&self.app, &csrf_state)?;

        let record = SessionRecord::authorization_requested(csrf_state);
        let session_id = record.id.clone();
        self.store.save(record).await?;

        log::info!(
            "Authorization requested for session {}",
            mask_secret(&session_id)
        );
        Ok(AuthorizationRedirect {
            session_id,
            location,
        })
    }

    /// Handle the consent callback for the session named by the cookie.
    ///
    /// The `state` must equal the one issued by [`begin`](Self::begin) for
    /// that same record; only then is the code exchanged. The record is
    /// claimed before the exchange, so a second callback for it fails
    /// without touching the backend. A wrong state or a failed exchange
    /// drops the record.
    pub async fn complete(
        &self,
        session_id: Option<&str>,
        callback: &OAuthCallback,
    ) -> CoreResult<()> {
        if let Some(error) = &callback.error {
            let detail = callback.error_description.as_deref().unwrap_or(error);
            return Err(CoreError::AuthorizationFailed(detail.to_string()));
        }

        let code = callback
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CoreError::AuthorizationFailed("missing code".to_string()))?;

        let id = session_id.ok_or_else(no_pending)?;
        let presented = callback.state.as_deref().unwrap_or_default();
        match self.store.claim_pending(id, presented).await? {
            PendingClaim::Claimed => {}
            PendingClaim::StateMismatch => {
                log::warn!(
                    "State mismatch for session {}, authorization dropped",
                    mask_secret(id)
                );
                return Err(CoreError::AuthorizationFailed("state mismatch".to_string()));
            }
            PendingClaim::NotPending => return Err(no_pending()),
        }

        let session = match self.provider.exchange_code(&self.app, code).await {
            Ok(session) => session,
            Err(e) => {
                self.store.remove(id).await?;
                return Err(CoreError::AuthorizationFailed(e.to_string()));
            }
        };

        // Gone if it was swept while the exchange was in flight.
        let mut record = self.store.get(id).await?.ok_or_else(no_pending)?;

        log::info!(
            "Session {} authenticated against {}",
            mask_secret(&record.id),
            session.instance_url
        );
        record.state = SessionState::Authenticated { session };
        self.store.save(record).await
    }

    /// Backend session for the cookie, or [`CoreError::NotAuthenticated`].
    pub async fn session_for(&self, session_id: Option<&str>) -> CoreResult<CrmSession> {
        let Some(id) = session_id else {
            return Err(CoreError::NotAuthenticated);
        };
        self.store
            .get(id)
            .await?
            .and_then(|record| record.crm_session().cloned())
            .ok_or(CoreError::NotAuthenticated)
    }

    /// Whether the cookie names an authenticated record.
    pub async fn is_authenticated(&self, session_id: Option<&str>) -> bool {
        self.session_for(session_id).await.is_ok()
    }
}
