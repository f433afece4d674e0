//! Salesforce CRM Provider
//!
//! Sessions come from the SOAP partner `login` call (password flow) or the
//! OAuth2 web-server flow; lead reads go through the REST API.

mod auth;
mod error;
mod http;
mod provider;
mod soql;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::{create_http_client, normalize_base_url};

pub(crate) use types::{
    SalesforceErrorBody, SalesforceLead, SalesforceOAuthError, SalesforceQueryResponse,
    SalesforceTokenResponse,
};

/// Default login host for production orgs.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
/// REST / SOAP API version used for every call.
pub(crate) const API_VERSION: &str = "60.0";
/// Lead fields read by both search and fetch.
pub(crate) const LEAD_FIELDS: &[&str] = &["Id", "Name", "Company", "Email", "Status", "Phone"];
/// Scopes requested during the authorization-code flow.
pub(crate) const OAUTH_SCOPES: &str = "api refresh_token";

/// Salesforce CRM Provider
pub struct SalesforceProvider {
    pub(crate) client: Client,
    pub(crate) login_url: String,
}

impl SalesforceProvider {
    /// Create a provider that logs in through `login_url`
    /// (e.g. `https://login.salesforce.com` or `https://test.salesforce.com`).
    pub fn new(login_url: &str) -> Result<Self> {
        Ok(Self {
            client: create_http_client("salesforce")?,
            login_url: normalize_base_url(login_url),
        })
    }

    /// `/services/data/vXX.X` prefix for REST calls.
    pub(crate) fn rest_prefix() -> String {
        format!("/services/data/v{API_VERSION}")
    }
}
