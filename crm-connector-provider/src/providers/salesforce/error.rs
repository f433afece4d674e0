//! Salesforce error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::SalesforceProvider;

/// Salesforce error code mapping
///
/// Codes come from three places: REST `errorCode` values, SOAP fault codes
/// (with the `sf:` prefix stripped) and OAuth2 `error` values.
/// Reference: <https://developer.salesforce.com/docs/atlas.en-us.api_rest.meta/api_rest/errorcodes.htm>
impl ProviderErrorMapper for SalesforceProvider {
    fn provider_name(&self) -> &'static str {
        "salesforce"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let code = raw
            .code
            .as_deref()
            .map(|c| c.strip_prefix("sf:").unwrap_or(c));

        match code {
            // Bearer token rejected
            Some("INVALID_SESSION_ID") => ProviderError::SessionExpired {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Login / token exchange rejected
            Some(
                "INVALID_LOGIN"
                | "LOGIN_MUST_USE_SECURITY_TOKEN"
                | "INVALID_OPERATION_WITH_EXPIRED_PASSWORD"
                | "PASSWORD_LOCKOUT"
                | "invalid_grant"
                | "invalid_client"
                | "invalid_client_id"
                | "unauthorized_client"
                | "redirect_uri_mismatch",
            ) => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Record does not exist or was deleted
            Some("NOT_FOUND" | "ENTITY_IS_DELETED") => ProviderError::RecordNotFound {
                provider: self.provider_name().to_string(),
                record_id: context.record_id.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            // Rejected input
            Some(
                "MALFORMED_ID"
                | "MALFORMED_QUERY"
                | "INVALID_FIELD"
                | "INVALID_TYPE"
                | "INVALID_QUERY_FILTER_OPERATOR",
            ) => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: context.param.unwrap_or_else(|| "query".to_string()),
                detail: raw.message,
            },

            // Missing permissions
            Some(
                "INSUFFICIENT_ACCESS"
                | "INSUFFICIENT_ACCESS_OR_READONLY"
                | "API_DISABLED_FOR_ORG"
                | "API_CURRENTLY_DISABLED"
                | "FUNCTIONALITY_NOT_ENABLED",
            ) => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Daily API request limit
            Some("REQUEST_LIMIT_EXCEEDED") => ProviderError::QuotaExceeded {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            _ => self.unknown_error(raw),
        }
    }
}
