//! Connector protocol wire shapes
//!
//! These types are what `/call/search`, `/call/fetch`, `/tools/list` and `/`
//! put on the wire. The tool schemas are derived from the same structs, so
//! the advertised shapes cannot drift from the live ones.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============ Call parameters ============

/// Body of `POST /call/search`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Free-text fragment matched against the lead name. Empty lists leads broadly.
    #[serde(default)]
    #[schemars(description = "Text contained in the lead name; empty matches any lead")]
    pub query: String,
}

/// Body of `POST /call/fetch`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Backend record id, as returned by search.
    #[schemars(description = "Lead id as returned by search")]
    pub id: String,
}

/// Query string of `GET /auth/callback` and `GET /oauth2/callback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the backend when the user denies consent.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// ============ Call results ============

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResultItem {
    pub id: String,
    pub title: String,
    pub text: String,
    /// Always `null`: leads have no public link.
    pub url: Option<String>,
}

/// Response of `POST /call/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
}

/// Secondary lead fields; every key is always present, missing values are `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LeadMetadata {
    pub company: String,
    pub email: String,
    pub status: String,
    pub phone: String,
}

/// Response of `POST /call/fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FetchResultItem {
    pub id: String,
    pub title: String,
    pub text: String,
    /// Always `null`: leads have no public link.
    pub url: Option<String>,
    pub metadata: LeadMetadata,
}

// ============ Discovery ============

/// One entry of `GET /tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    pub output_schema: serde_json::Value,
}

/// Response of `GET /tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolList {
    pub tools: Vec<ToolDescriptor>,
}

/// Authentication descriptor in the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorAuth {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Response of `GET`/`POST /`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub auth: ConnectorAuth,
    pub endpoints: Vec<String>,
}
