//! Salesforce API 类型定义

use serde::Deserialize;

/// REST API 错误项（响应体为数组）
#[derive(Debug, Deserialize)]
pub struct SalesforceApiError {
    #[serde(rename = "errorCode")]
    pub error_code: String,
    pub message: String,
}

/// REST 错误响应体：通常为数组，少数端点返回单个对象
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SalesforceErrorBody {
    Many(Vec<SalesforceApiError>),
    One(SalesforceApiError),
}

impl SalesforceErrorBody {
    pub fn into_first(self) -> Option<SalesforceApiError> {
        match self {
            Self::Many(errors) => errors.into_iter().next(),
            Self::One(error) => Some(error),
        }
    }
}

/// SOQL query 响应
#[derive(Debug, Deserialize)]
pub struct SalesforceQueryResponse<T> {
    #[serde(rename = "totalSize")]
    pub total_size: u32,
    #[allow(dead_code)]
    pub done: bool,
    pub records: Vec<T>,
}

/// Lead 记录（REST 响应字段为 PascalCase）
#[derive(Debug, Deserialize)]
pub struct SalesforceLead {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
}

/// OAuth2 token 端点成功响应
#[derive(Debug, Deserialize)]
pub struct SalesforceTokenResponse {
    pub access_token: String,
    pub instance_url: String,
    /// Identity URL, e.g. `https://login.salesforce.com/id/00D.../005...`
    pub id: String,
    #[serde(default)]
    pub issued_at: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth2 token 端点错误响应
#[derive(Debug, Deserialize)]
pub struct SalesforceOAuthError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}
