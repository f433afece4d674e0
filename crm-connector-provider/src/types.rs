//! Provider-level data types: credentials, authenticated sessions and lead records.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

// ============ Credentials ============

/// Username/password login credentials.
///
/// The backend expects the security token appended to the password.
#[derive(Debug, Clone)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: SecretString,
    pub security_token: SecretString,
}

impl PasswordCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            security_token: SecretString::from(security_token.into()),
        }
    }

    /// `password ‖ security_token`, as sent to the login endpoint.
    pub(crate) fn password_with_token(&self) -> String {
        format!(
            "{}{}",
            self.password.expose_secret(),
            self.security_token.expose_secret()
        )
    }
}

/// Connected-app credentials for the OAuth2 authorization-code flow.
#[derive(Debug, Clone)]
pub struct OAuthAppCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

impl OAuthAppCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// Credentials for one deployment; the two styles are mutually exclusive.
#[derive(Debug, Clone)]
pub enum ProviderCredentials {
    Password(PasswordCredentials),
    OAuth(OAuthAppCredentials),
}

impl ProviderCredentials {
    /// Short name of the authentication style, as advertised to clients.
    pub fn auth_type(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::OAuth(_) => "oauth2",
        }
    }
}

// ============ Session ============

/// An authenticated handle to the backend: instance location plus bearer token.
///
/// Never mutated after creation; cloning shares nothing mutable.
#[derive(Debug, Clone)]
pub struct CrmSession {
    /// Origin of the org instance, e.g. `https://na1.salesforce.com`.
    pub instance_url: String,
    access_token: SecretString,
    /// Backend user id (or identity URL for OAuth sessions), if reported.
    pub user_id: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl CrmSession {
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: SecretString::from(access_token.into()),
            user_id: None,
            issued_at: None,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

// ============ Records ============

/// Read-only projection of a backend `Lead`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
}
