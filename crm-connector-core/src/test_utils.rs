//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use crm_connector_provider::{
    CrmProvider, CrmSession, LeadRecord, OAuthAppCredentials, PasswordCredentials, ProviderError,
};
use tokio::sync::RwLock;

// ===== MockCrmProvider =====

/// In-memory backend: a fixed set of leads and a counter per backend call.
pub struct MockCrmProvider {
    leads: RwLock<Vec<LeadRecord>>,
    /// 如果 Some，查询时返回此错误
    query_error: RwLock<Option<ProviderError>>,
    /// 如果 Some，code 换 token 时返回此错误
    exchange_error: RwLock<Option<ProviderError>>,
    pub search_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
}

impl MockCrmProvider {
    pub fn new() -> Self {
        Self {
            leads: RwLock::new(Vec::new()),
            query_error: RwLock::new(None),
            exchange_error: RwLock::new(None),
            search_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
        }
    }

    pub async fn with_leads(self, leads: Vec<LeadRecord>) -> Self {
        *self.leads.write().await = leads;
        self
    }

    pub async fn set_query_error(&self, err: Option<ProviderError>) {
        *self.query_error.write().await = err;
    }

    pub async fn set_exchange_error(&self, err: Option<ProviderError>) {
        *self.exchange_error.write().await = err;
    }

    pub fn backend_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst) + self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrmProvider for MockCrmProvider {
    async fn login(&self, _credentials: &PasswordCredentials) -> crm_connector_provider::Result<CrmSession> {
        Ok(test_session())
    }

    fn authorize_url(
        &self,
        app: &OAuthAppCredentials,
        state: &str,
    ) -> crm_connector_provider::Result<String> {
        Ok(format!(
            "https://login.example.com/services/oauth2/authorize?client_id={}&state={state}",
            app.client_id
        ))
    }

    async fn exchange_code(
        &self,
        _app: &OAuthAppCredentials,
        code: &str,
    ) -> crm_connector_provider::Result<CrmSession> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.exchange_error.read().await.clone() {
            return Err(err);
        }
        Ok(CrmSession::new("https://na1.example.com", format!("token-for-{code}")))
    }

    async fn search_leads(
        &self,
        _session: &CrmSession,
        name_contains: &str,
        limit: u32,
    ) -> crm_connector_provider::Result<Vec<LeadRecord>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.query_error.read().await.clone() {
            return Err(err);
        }
        Ok(self
            .leads
            .read()
            .await
            .iter()
            .filter(|l| l.name.contains(name_contains))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_lead(
        &self,
        _session: &CrmSession,
        lead_id: &str,
    ) -> crm_connector_provider::Result<LeadRecord> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.query_error.read().await.clone() {
            return Err(err);
        }
        self.leads
            .read()
            .await
            .iter()
            .find(|l| l.id == lead_id)
            .cloned()
            .ok_or_else(|| ProviderError::RecordNotFound {
                provider: "mock".to_string(),
                record_id: lead_id.to_string(),
                raw_message: None,
            })
    }
}

// ===== 工厂方法 =====

pub fn test_session() -> CrmSession {
    CrmSession::new("https://na1.example.com", "00Dtest!token")
}

pub fn test_app() -> OAuthAppCredentials {
    OAuthAppCredentials::new("client-id", "client-secret", "https://gw.example.com/oauth2/callback")
}

pub fn lead(id: &str, name: &str, company: Option<&str>, email: Option<&str>) -> LeadRecord {
    LeadRecord {
        id: id.to_string(),
        name: name.to_string(),
        company: company.map(str::to_string),
        email: email.map(str::to_string),
        status: None,
        phone: None,
    }
}

pub fn acme_lead() -> LeadRecord {
    LeadRecord {
        id: "00Q5e00000AcmeAAA".to_string(),
        name: "Acme Corp Lead".to_string(),
        company: Some("Acme Corp".to_string()),
        email: Some("x@acme.com".to_string()),
        status: Some("Open - Not Contacted".to_string()),
        phone: Some("+1 415 555 0100".to_string()),
    }
}

pub async fn mock_provider(leads: Vec<LeadRecord>) -> Arc<MockCrmProvider> {
    Arc::new(MockCrmProvider::new().with_leads(leads).await)
}
