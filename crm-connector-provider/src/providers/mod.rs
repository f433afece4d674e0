//! CRM Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod salesforce;

pub use salesforce::{DEFAULT_LOGIN_URL, SalesforceProvider};
