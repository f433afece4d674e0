//! Lead 查询服务
//!
//! Turns a search term or record id into one backend call and reshapes the
//! resulting lead records into connector result items.

use std::sync::Arc;

use crm_connector_provider::{CrmProvider, CrmSession, LeadRecord};

use crate::error::{CoreError, CoreResult};
use crate::types::{FetchResultItem, LeadMetadata, SearchResponse, SearchResultItem};

/// Maximum number of items a search returns.
pub const SEARCH_LIMIT: u32 = 5;

/// Lead 查询服务
pub struct LeadService {
    provider: Arc<dyn CrmProvider>,
}

impl LeadService {
    /// 创建 Lead 服务实例
    #[must_use]
    pub fn new(provider: Arc<dyn CrmProvider>) -> Self {
        Self { provider }
    }

    /// Leads whose name contains `query`, at most [`SEARCH_LIMIT`].
    ///
    /// An empty query is not rejected; it lists leads broadly.
    pub async fn search(&self, session: &CrmSession, query: &str) -> CoreResult<SearchResponse> {
        let leads = self
            .provider
            .search_leads(session, query, SEARCH_LIMIT)
            .await?;

        log::debug!("Lead search for {query:?} returned {} record(s)", leads.len());

        let results = leads
            .into_iter()
            .take(SEARCH_LIMIT as usize)
            .map(to_search_item)
            .collect();

        Ok(SearchResponse { results })
    }

    /// Point lookup by id. A blank id is rejected before any backend call.
    pub async fn fetch(&self, session: &CrmSession, id: &str) -> CoreResult<FetchResultItem> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CoreError::ValidationError("id is required".to_string()));
        }

        let lead = self.provider.get_lead(session, id).await?;
        Ok(to_fetch_item(lead))
    }

    /// First [`SEARCH_LIMIT`] leads in backend order, unshaped.
    pub async fn list_recent(&self, session: &CrmSession) -> CoreResult<Vec<LeadRecord>> {
        let mut leads = self.provider.search_leads(session, "", SEARCH_LIMIT).await?;
        leads.truncate(SEARCH_LIMIT as usize);
        Ok(leads)
    }
}

// ============ Reshaping ============

fn title_of(lead: &LeadRecord) -> String {
    let name = lead.name.trim();
    if name.is_empty() {
        lead.id.clone()
    } else {
        name.to_string()
    }
}

fn to_search_item(lead: LeadRecord) -> SearchResultItem {
    let title = title_of(&lead);
    let text = format!(
        "Company: {}, Email: {}",
        lead.company.as_deref().unwrap_or_default(),
        lead.email.as_deref().unwrap_or_default()
    );

    SearchResultItem {
        id: lead.id,
        title,
        text,
        url: None,
    }
}

fn to_fetch_item(lead: LeadRecord) -> FetchResultItem {
    let title = title_of(&lead);
    let metadata = LeadMetadata {
        company: lead.company.unwrap_or_default(),
        email: lead.email.unwrap_or_default(),
        status: lead.status.unwrap_or_default(),
        phone: lead.phone.unwrap_or_default(),
    };
    let text = summary_sentence(&title, &metadata);

    FetchResultItem {
        id: lead.id,
        title,
        text,
        url: None,
        metadata,
    }
}

/// e.g. `Acme Corp Lead is a lead at Acme Corp (status: Open). Contact: x@acme.com, +1 555.`
fn summary_sentence(title: &str, metadata: &LeadMetadata) -> String {
    let mut text = format!("{title} is a lead");
    if !metadata.company.is_empty() {
        text.push_str(" at ");
        text.push_str(&metadata.company);
    }
    if !metadata.status.is_empty() {
        text.push_str(" (status: ");
        text.push_str(&metadata.status);
        text.push(')');
    }
    text.push('.');

    let contact: Vec<&str> = [metadata.email.as_str(), metadata.phone.as_str()]
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect();
    if !contact.is_empty() {
        text.push_str(" Contact: ");
        text.push_str(&contact.join(", "));
        text.push('.');
    }
    text
}
