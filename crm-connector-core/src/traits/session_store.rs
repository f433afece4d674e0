//! Session store abstract Trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::{PendingClaim, SessionRecord, SessionState};

/// Session Store Trait
///
/// Server-side table of authorization-code sessions, indexed by the opaque
/// id carried in the session cookie. Provides a default in-memory
/// implementation, `InMemorySessionStore`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a record by cookie id
    ///
    /// # Returns
    /// * `Ok(Some(record))` - record exists
    /// * `Ok(None)` - unknown id (treated as unauthenticated)
    async fn get(&self, id: &str) -> CoreResult<Option<SessionRecord>>;

    /// Insert or replace a record
    async fn save(&self, record: SessionRecord) -> CoreResult<()>;

    /// Drop a record
    async fn remove(&self, id: &str) -> CoreResult<()>;

    /// Atomically move a record from `AuthorizationRequested` to `Exchanging`
    ///
    /// Only succeeds when the stored state equals `csrf_state`. A mismatch
    /// drops the record, so the pending authorization cannot be retried.
    async fn claim_pending(&self, id: &str, csrf_state: &str) -> CoreResult<PendingClaim>;

    /// Drop unauthenticated records created before `created_before`, then the
    /// oldest remaining ones until at most `keep` are left.
    ///
    /// # Returns
    /// Number of records removed
    async fn prune_pending(&self, created_before: DateTime<Utc>, keep: usize)
    -> CoreResult<usize>;

    /// Number of stored records
    async fn len(&self) -> usize;
}

/// In-memory session store
///
/// Lives as long as the process; a restart logs everyone out.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    records: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> CoreResult<Option<SessionRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: SessionRecord) -> CoreResult<()> {
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn remove(&self, id: &str) -> CoreResult<()> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn claim_pending(&self, id: &str, csrf_state: &str) -> CoreResult<PendingClaim> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(id) else {
            return Ok(PendingClaim::NotPending);
        };
        let SessionState::AuthorizationRequested { csrf_state: expected } = &record.state else {
            return Ok(PendingClaim::NotPending);
        };

        if expected.as_str() != csrf_state {
            records.remove(id);
            return Ok(PendingClaim::StateMismatch);
        }
        record.state = SessionState::Exchanging;
        Ok(PendingClaim::Claimed)
    }

    async fn prune_pending(
        &self,
        created_before: DateTime<Utc>,
        keep: usize,
    ) -> CoreResult<usize> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !r.is_pending() || r.created_at >= created_before);

        let mut pending: Vec<(DateTime<Utc>, String)> = records
            .values()
            .filter(|r| r.is_pending())
            .map(|r| (r.created_at, r.id.clone()))
            .collect();
        if pending.len() > keep {
            pending.sort_unstable();
            let excess = pending.len() - keep;
            for (_, id) in pending.into_iter().take(excess) {
                records.remove(&id);
            }
        }

        Ok(before - records.len())
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}
