use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use crm_connector_core::InMemorySessionStore;
use crm_connector_provider::{
    CrmProvider, CrmSession, LeadRecord, OAuthAppCredentials, PasswordCredentials, ProviderError,
    Result as ProviderResult,
};

use crate::state::AppState;

pub const STARTUP_TOKEN: &str = "00Dstartup!token";
pub const INSTANCE_URL: &str = "https://na1.example.com";

/// Backend double: fixed leads, call counters, and every bearer token it was handed.
#[derive(Default)]
pub struct MockCrmProvider {
    leads: Vec<LeadRecord>,
    fail_queries: bool,
    pub search_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    seen_tokens: Mutex<Vec<String>>,
}

impl MockCrmProvider {
    pub fn with_leads(leads: Vec<LeadRecord>) -> Self {
        Self {
            leads,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }

    pub fn backend_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst) + self.get_calls.load(Ordering::SeqCst)
    }

    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }

    fn record(&self, session: &CrmSession) -> ProviderResult<()> {
        self.seen_tokens
            .lock()
            .unwrap()
            .push(session.access_token().to_string());
        if self.fail_queries {
            return Err(ProviderError::Unknown {
                provider: "salesforce".to_string(),
                raw_code: Some("SERVER_UNAVAILABLE".to_string()),
                raw_message: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CrmProvider for MockCrmProvider {
    async fn login(&self, _credentials: &PasswordCredentials) -> ProviderResult<CrmSession> {
        Ok(startup_session())
    }

    fn authorize_url(&self, app: &OAuthAppCredentials, state: &str) -> ProviderResult<String> {
        Ok(format!(
            "https://login.example.com/services/oauth2/authorize?response_type=code&client_id={}&state={state}",
            app.client_id
        ))
    }

    async fn exchange_code(
        &self,
        _app: &OAuthAppCredentials,
        code: &str,
    ) -> ProviderResult<CrmSession> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CrmSession::new(INSTANCE_URL, format!("oauth-{code}")))
    }

    async fn search_leads(
        &self,
        session: &CrmSession,
        name_contains: &str,
        limit: u32,
    ) -> ProviderResult<Vec<LeadRecord>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.record(session)?;
        Ok(self
            .leads
            .iter()
            .filter(|l| l.name.contains(name_contains))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_lead(&self, session: &CrmSession, lead_id: &str) -> ProviderResult<LeadRecord> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.record(session)?;
        self.leads
            .iter()
            .find(|l| l.id == lead_id)
            .cloned()
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "salesforce".to_string(),
                record_id: lead_id.to_string(),
                raw_message: Some("The requested resource does not exist".to_string()),
            })
    }
}

pub fn startup_session() -> CrmSession {
    CrmSession::new(INSTANCE_URL, STARTUP_TOKEN)
}

pub fn acme_lead() -> LeadRecord {
    LeadRecord {
        id: "00Q5e00000AcmeAAA".to_string(),
        name: "Acme Corp Lead".to_string(),
        company: Some("Acme Corp".to_string()),
        email: Some("x@acme.com".to_string()),
        status: Some("Working - Contacted".to_string()),
        phone: None,
    }
}

pub fn numbered_leads(count: usize) -> Vec<LeadRecord> {
    (0..count)
        .map(|i| LeadRecord {
            id: format!("00Q{i:012}"),
            name: format!("Lead {i}"),
            company: Some(format!("Company {i}")),
            email: None,
            status: None,
            phone: None,
        })
        .collect()
}

pub fn password_state(provider: &Arc<MockCrmProvider>) -> web::Data<AppState> {
    let provider: Arc<dyn CrmProvider> = provider.clone();
    web::Data::new(AppState::password(provider, startup_session()))
}

pub fn oauth_state(provider: &Arc<MockCrmProvider>) -> web::Data<AppState> {
    let provider: Arc<dyn CrmProvider> = provider.clone();
    web::Data::new(AppState::oauth(
        provider,
        OAuthAppCredentials::new("client-id", "client-secret", "https://gw.example.com/oauth2/callback"),
        Arc::new(InMemorySessionStore::new()),
        false,
    ))
}
