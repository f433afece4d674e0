//! # crm-connector-provider
//!
//! CRM backend abstraction used by the connector gateway: obtaining an
//! authenticated session and running the two read operations the gateway
//! exposes (lead search by name, lead lookup by id).
//!
//! ## Supported Providers
//!
//! | Provider | Session sources | Read API |
//! |----------|-----------------|----------|
//! | [Salesforce](https://www.salesforce.com/) | SOAP partner `login` (password + security token), OAuth2 authorization code | REST `v60.0` query / sObject retrieve |
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for static and cross-compiled builds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use crm_connector_provider::{CrmProvider, PasswordCredentials, SalesforceProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = SalesforceProvider::new("https://login.salesforce.com")?;
//!
//!     // 1. Log in once
//!     let credentials = PasswordCredentials::new("user@example.com", "password", "token");
//!     let session = provider.login(&credentials).await?;
//!
//!     // 2. Search leads by name
//!     for lead in provider.search_leads(&session, "Acme", 5).await? {
//!         println!("{} ({})", lead.name, lead.id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError).
//! Salesforce error codes are mapped onto structured variants, for example:
//!
//! - [`ProviderError::InvalidCredentials`]: login or code exchange rejected
//! - [`ProviderError::SessionExpired`]: bearer token no longer accepted
//! - [`ProviderError::RecordNotFound`]: lead id does not exist
//! - [`ProviderError::NetworkError`]: network connectivity issue
//!
//! Requests are never retried.

mod error;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export core trait only (internal traits are not exported)
pub use traits::CrmProvider;

// Re-export types
pub use types::{
    CrmSession, LeadRecord, OAuthAppCredentials, PasswordCredentials, ProviderCredentials,
};

// Re-export log helpers for callers that log session ids
pub use utils::log_sanitizer::mask_secret;

// Re-export concrete providers
pub use providers::SalesforceProvider;

/// Default Salesforce login host.
pub use providers::DEFAULT_LOGIN_URL;
