//! Salesforce `CrmProvider` trait 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{CrmProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{CrmSession, LeadRecord, OAuthAppCredentials, PasswordCredentials};

use super::soql::lead_search_query;
use super::{LEAD_FIELDS, SalesforceLead, SalesforceProvider, SalesforceQueryResponse};

impl SalesforceProvider {
    /// 将 Salesforce Lead 转换为 `LeadRecord`
    pub(crate) fn lead_to_record(lead: SalesforceLead) -> LeadRecord {
        LeadRecord {
            id: lead.id,
            name: lead.name.unwrap_or_default(),
            company: lead.company,
            email: lead.email,
            status: lead.status,
            phone: lead.phone,
        }
    }
}

#[async_trait]
impl CrmProvider for SalesforceProvider {
    async fn login(&self, credentials: &PasswordCredentials) -> Result<CrmSession> {
        self.soap_login(credentials).await
    }

    fn authorize_url(&self, app: &OAuthAppCredentials, state: &str) -> Result<String> {
        self.build_authorize_url(app, state)
    }

    async fn exchange_code(&self, app: &OAuthAppCredentials, code: &str) -> Result<CrmSession> {
        self.token_exchange(app, code).await
    }

    async fn search_leads(
        &self,
        session: &CrmSession,
        name_contains: &str,
        limit: u32,
    ) -> Result<Vec<LeadRecord>> {
        let soql = lead_search_query(name_contains, limit);
        let path = format!(
            "{}/query?q={}",
            Self::rest_prefix(),
            urlencoding::encode(&soql)
        );

        let response: SalesforceQueryResponse<SalesforceLead> = self
            .rest_get(session, &path, ErrorContext::param("query"))
            .await?;

        log::debug!(
            "[{}] Lead search matched {} record(s)",
            self.provider_name(),
            response.total_size
        );

        Ok(response
            .records
            .into_iter()
            .take(limit as usize)
            .map(Self::lead_to_record)
            .collect())
    }

    async fn get_lead(&self, session: &CrmSession, lead_id: &str) -> Result<LeadRecord> {
        let path = format!(
            "{}/sobjects/Lead/{}?fields={}",
            Self::rest_prefix(),
            urlencoding::encode(lead_id),
            LEAD_FIELDS.join(",")
        );

        let lead: SalesforceLead = self
            .rest_get(session, &path, ErrorContext::record(lead_id))
            .await?;

        Ok(Self::lead_to_record(lead))
    }
}
