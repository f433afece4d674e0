//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use crm_connector_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Request body failed validation; no backend call was made
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No authenticated session is attached to the request
    #[error("not authenticated")]
    NotAuthenticated,

    /// Authorization-code callback rejected (state mismatch, missing code, exchange failure)
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// 是否为预期行为（用户输入、未登录等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ValidationError(_) | Self::NotAuthenticated | Self::AuthorizationFailed(_) => {
                true
            }
            Self::Provider(e) => e.is_expected(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
