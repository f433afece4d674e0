//! Connector discovery: handshake metadata and the tool list
//!
//! Schemas are generated from the same types the call routes serialize, so
//! `/tools/list` stays consistent with `/call/search` and `/call/fetch`.

use schemars::{JsonSchema, schema_for};

use crate::types::{
    ConnectorAuth, ConnectorInfo, FetchParams, FetchResultItem, SearchParams, SearchResponse,
    ToolDescriptor, ToolList,
};

const CONNECTOR_NAME: &str = "Salesforce MCP";
const CONNECTOR_DESCRIPTION: &str = "Custom connector to pull Salesforce data via MCP";
const CONNECTOR_VERSION: &str = "1.0";

/// Routes advertised in the handshake.
pub const CONNECTOR_ENDPOINTS: &[&str] = &["/tools/list", "/call/search", "/call/fetch"];

fn schema_value<T: JsonSchema>() -> serde_json::Value {
    schema_for!(T).to_value()
}

/// Handshake body for `GET`/`POST /`.
///
/// `auth_type` is `"password"` or `"oauth2"`.
pub fn connector_info(auth_type: &str) -> ConnectorInfo {
    ConnectorInfo {
        name: CONNECTOR_NAME.to_string(),
        description: CONNECTOR_DESCRIPTION.to_string(),
        version: CONNECTOR_VERSION.to_string(),
        auth: ConnectorAuth {
            kind: auth_type.to_string(),
        },
        endpoints: CONNECTOR_ENDPOINTS.iter().map(|e| (*e).to_string()).collect(),
    }
}

/// Static tool list for `GET /tools/list`.
pub fn tool_list() -> ToolList {
    ToolList {
        tools: vec![
            ToolDescriptor {
                name: "search".to_string(),
                description: "Search Salesforce leads whose name contains the query (at most 5)"
                    .to_string(),
                input_schema: schema_value::<SearchParams>(),
                output_schema: schema_value::<SearchResponse>(),
            },
            ToolDescriptor {
                name: "fetch".to_string(),
                description: "Fetch one Salesforce lead by id".to_string(),
                input_schema: schema_value::<FetchParams>(),
                output_schema: schema_value::<FetchResultItem>(),
            },
        ],
    }
}
