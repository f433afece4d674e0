//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use crm_connector_provider::{
    CrmProvider, CrmSession, DEFAULT_LOGIN_URL, PasswordCredentials, SalesforceProvider,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Live-org test context built from `SF_*` environment variables.
pub struct TestContext {
    pub provider: Arc<dyn CrmProvider>,
    pub credentials: PasswordCredentials,
    /// Name fragment expected to match at least one lead (`SF_TEST_LEAD_NAME`).
    pub lead_name: Option<String>,
}

impl TestContext {
    /// 创建 Salesforce 测试上下文
    pub fn salesforce() -> Option<Self> {
        let username = env::var("SF_USERNAME").ok()?;
        let password = env::var("SF_PASSWORD").ok()?;
        let security_token = env::var("SF_SECURITY_TOKEN").unwrap_or_default();
        let login_url = env::var("SF_LOGIN_URL").unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string());

        let provider = SalesforceProvider::new(&login_url).ok()?;

        Some(Self {
            provider: Arc::new(provider),
            credentials: PasswordCredentials::new(username, password, security_token),
            lead_name: env::var("SF_TEST_LEAD_NAME").ok(),
        })
    }

    pub async fn login(&self) -> Option<CrmSession> {
        self.provider.login(&self.credentials).await.ok()
    }
}
