//! Server-side session records for the authorization-code flow

use chrono::{DateTime, Utc};
use crm_connector_provider::CrmSession;

/// Where a browser session is in the authorization-code flow.
///
/// `Unauthenticated` is the absence of a record; there is no transition
/// back from `Authenticated`.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Redirect to the consent page issued; waiting for the callback.
    AuthorizationRequested { csrf_state: String },
    /// State matched; the one-time code is being exchanged.
    Exchanging,
    /// Code exchanged; the token is kept server-side only.
    Authenticated { session: CrmSession },
}

/// One row of the session table. The cookie carries `id` and nothing else.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// New record awaiting the callback, with a fresh opaque id.
    pub fn authorization_requested(csrf_state: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: SessionState::AuthorizationRequested {
                csrf_state: csrf_state.into(),
            },
            created_at: Utc::now(),
        }
    }

    /// The stored backend session, if the flow completed.
    pub fn crm_session(&self) -> Option<&CrmSession> {
        match &self.state {
            SessionState::Authenticated { session } => Some(session),
            SessionState::AuthorizationRequested { .. } | SessionState::Exchanging => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.crm_session().is_some()
    }

    /// Record still waiting for (or in the middle of) the callback.
    pub fn is_pending(&self) -> bool {
        !self.is_authenticated()
    }
}

/// Outcome of [`SessionStore::claim_pending`](crate::traits::SessionStore::claim_pending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingClaim {
    /// State matched; the record is now [`SessionState::Exchanging`].
    Claimed,
    /// State did not match; the record was dropped.
    StateMismatch,
    /// Unknown id, or the record is not awaiting a callback.
    NotPending,
}
