//! Salesforce REST 请求方法

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::CrmSession;
use crate::utils::log_sanitizer::truncate_for_log;

use super::{SalesforceErrorBody, SalesforceProvider};

impl SalesforceProvider {
    /// 执行已认证的 REST GET 请求
    ///
    /// `path_and_query` is appended to the session's instance URL and must be
    /// already URL-encoded.
    pub(crate) async fn rest_get<T: DeserializeOwned>(
        &self,
        session: &CrmSession,
        path_and_query: &str,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path_and_query}", session.instance_url);

        let request = self
            .client
            .get(&url)
            .bearer_auth(session.access_token())
            .header(ACCEPT, "application/json");

        let (status, body) =
            HttpUtils::execute_request(request, self.provider_name(), "GET", path_and_query)
                .await?;

        if !HttpUtils::is_success(status) {
            return Err(self.rest_error(status, &body, context));
        }

        HttpUtils::parse_json(&body, self.provider_name())
    }

    /// 将非 2xx 的 REST 响应转换为统一错误
    pub(crate) fn rest_error(&self, status: u16, body: &str, context: ErrorContext) -> ProviderError {
        let raw = match serde_json::from_str::<SalesforceErrorBody>(body)
            .ok()
            .and_then(SalesforceErrorBody::into_first)
        {
            Some(api_error) => RawApiError::with_code(api_error.error_code, api_error.message),
            // Bodies without an error array still carry meaning in the status line.
            None => match status {
                401 => RawApiError::with_code("INVALID_SESSION_ID", truncate_for_log(body)),
                404 => RawApiError::with_code("NOT_FOUND", "The requested resource does not exist"),
                _ => RawApiError::new(format!("HTTP {status}: {}", truncate_for_log(body))),
            },
        };

        log::warn!(
            "[{}] API error (HTTP {status}): {:?} {}",
            self.provider_name(),
            raw.code,
            raw.message
        );
        self.map_error(raw, context)
    }
}
