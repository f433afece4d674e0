use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{CrmSession, LeadRecord, OAuthAppCredentials, PasswordCredentials};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（如 `NOT_FOUND`、`invalid_grant`、SOAP faultcode）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 记录 ID（用于 `RecordNotFound`）
    pub record_id: Option<String>,
    /// 触发错误的参数名（用于 `InvalidParameter`）
    pub param: Option<String>,
}

impl ErrorContext {
    pub fn record(record_id: &str) -> Self {
        Self {
            record_id: Some(record_id.to_string()),
            param: Some("id".to_string()),
        }
    }

    pub fn param(param: &str) -> Self {
        Self {
            record_id: None,
            param: Some(param.to_string()),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 各 Provider 实现此 trait 以将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// CRM backend Trait
///
/// Covers the two ways of obtaining a [`CrmSession`] and the two read
/// operations the gateway proxies. Implementations never write backend data.
#[async_trait]
pub trait CrmProvider: Send + Sync {
    /// Exchange username + password (+ security token) for a session.
    async fn login(&self, credentials: &PasswordCredentials) -> Result<CrmSession>;

    /// Consent URL the browser is redirected to when starting the
    /// authorization-code flow. `state` is echoed back to the callback.
    fn authorize_url(&self, app: &OAuthAppCredentials, state: &str) -> Result<String>;

    /// Exchange a one-time authorization code for a bearer token and instance URL.
    async fn exchange_code(&self, app: &OAuthAppCredentials, code: &str) -> Result<CrmSession>;

    /// Leads whose name contains `name_contains`, at most `limit` of them, in
    /// backend order. An empty term matches every lead.
    async fn search_leads(
        &self,
        session: &CrmSession,
        name_contains: &str,
        limit: u32,
    ) -> Result<Vec<LeadRecord>>;

    /// Point lookup of a lead by its backend identifier.
    async fn get_lead(&self, session: &CrmSession, lead_id: &str) -> Result<LeadRecord>;
}
