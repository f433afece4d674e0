//! Salesforce 认证：SOAP 密码登录与 OAuth2 授权码流程

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use hmac::{Hmac, Mac};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use sha2::Sha256;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::providers::common::origin_of;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::types::{CrmSession, OAuthAppCredentials, PasswordCredentials};
use crate::utils::datetime::parse_epoch_str;
use crate::utils::log_sanitizer::{mask_secret, truncate_for_log};

use super::{
    API_VERSION, OAUTH_SCOPES, SalesforceOAuthError, SalesforceProvider, SalesforceTokenResponse,
};

type HmacSha256 = Hmac<Sha256>;

impl SalesforceProvider {
    // ============ Password flow (SOAP partner login) ============

    pub(crate) async fn soap_login(&self, credentials: &PasswordCredentials) -> Result<CrmSession> {
        let url = format!("{}/services/Soap/u/{API_VERSION}", self.login_url);
        let envelope = soap_login_envelope(
            &credentials.username,
            &credentials.password_with_token(),
        );

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(envelope);

        let (status, body) =
            HttpUtils::execute_request(request, self.provider_name(), "POST", "SOAP login").await?;

        let session = self.parse_login_response(status, &body)?;
        log::info!(
            "[{}] Logged in as {} (instance {}, session {})",
            self.provider_name(),
            credentials.username,
            session.instance_url,
            mask_secret(session.access_token())
        );
        Ok(session)
    }

    /// 解析 SOAP login 响应（成功或 Fault）
    pub(crate) fn parse_login_response(&self, status: u16, body: &str) -> Result<CrmSession> {
        if let Some(fault) = extract_tag(body, "faultstring") {
            let code = extract_tag(body, "faultcode").unwrap_or_default();
            log::warn!(
                "[{}] SOAP login fault (HTTP {status}): {code}",
                self.provider_name()
            );
            return Err(self.map_error(
                RawApiError::with_code(xml_unescape(code), xml_unescape(fault)),
                ErrorContext::default(),
            ));
        }

        if !HttpUtils::is_success(status) {
            return Err(self.map_error(
                RawApiError::new(format!("HTTP {status}: {}", truncate_for_log(body))),
                ErrorContext::default(),
            ));
        }

        let session_id = extract_tag(body, "sessionId")
            .ok_or_else(|| self.parse_error("login response missing sessionId"))?;
        let server_url = extract_tag(body, "serverUrl")
            .ok_or_else(|| self.parse_error("login response missing serverUrl"))?;
        let instance_url = origin_of(&xml_unescape(server_url))
            .ok_or_else(|| self.parse_error(format!("invalid serverUrl: {server_url}")))?;

        let mut session = CrmSession::new(instance_url, xml_unescape(session_id));
        if let Some(user_id) = extract_tag(body, "userId") {
            session = session.with_user_id(user_id);
        }
        Ok(session.with_issued_at(chrono::Utc::now()))
    }

    // ============ Authorization-code flow ============

    pub(crate) fn build_authorize_url(&self, app: &OAuthAppCredentials, state: &str) -> Result<String> {
        let endpoint = format!("{}/services/oauth2/authorize", self.login_url);
        url::Url::parse_with_params(
            &endpoint,
            &[
                ("response_type", "code"),
                ("client_id", app.client_id.as_str()),
                ("redirect_uri", app.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPES),
                ("state", state),
            ],
        )
        .map(|url| url.to_string())
        .map_err(|e| ProviderError::InvalidParameter {
            provider: self.provider_name().to_string(),
            param: "login_url".to_string(),
            detail: e.to_string(),
        })
    }

    pub(crate) async fn token_exchange(
        &self,
        app: &OAuthAppCredentials,
        code: &str,
    ) -> Result<CrmSession> {
        let endpoint = format!("{}/services/oauth2/token", self.login_url);
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.expose_secret()),
            ("redirect_uri", app.redirect_uri.as_str()),
        ];

        let request = self
            .client
            .post(&endpoint)
            .header(ACCEPT, "application/json")
            .form(&form);

        let (status, body) = HttpUtils::execute_request(
            request,
            self.provider_name(),
            "POST",
            "/services/oauth2/token",
        )
        .await?;

        self.parse_token_response(app, status, &body)
    }

    /// 解析 token 端点响应，并校验签名
    pub(crate) fn parse_token_response(
        &self,
        app: &OAuthAppCredentials,
        status: u16,
        body: &str,
    ) -> Result<CrmSession> {
        if !HttpUtils::is_success(status) {
            let raw = match serde_json::from_str::<SalesforceOAuthError>(body) {
                Ok(e) => {
                    let message = e.error_description.unwrap_or_else(|| e.error.clone());
                    RawApiError::with_code(e.error, message)
                }
                Err(_) => RawApiError::new(format!("HTTP {status}: {}", truncate_for_log(body))),
            };
            log::warn!(
                "[{}] Token exchange failed (HTTP {status}): {:?}",
                self.provider_name(),
                raw.code
            );
            return Err(self.map_error(raw, ErrorContext::default()));
        }

        let token: SalesforceTokenResponse = HttpUtils::parse_json(body, self.provider_name())?;

        if let (Some(issued_at), Some(signature)) = (&token.issued_at, &token.signature)
            && !verify_token_signature(
                app.client_secret.expose_secret(),
                &token.id,
                issued_at,
                signature,
            )
        {
            log::error!("[{}] Token response signature mismatch", self.provider_name());
            return Err(ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some("token response signature mismatch".to_string()),
            });
        }

        let mut session =
            CrmSession::new(token.instance_url, token.access_token).with_user_id(token.id);
        if let Some(issued_at) = token.issued_at.as_deref().and_then(parse_epoch_str) {
            session = session.with_issued_at(issued_at);
        }

        log::info!(
            "[{}] Authorization code exchanged (instance {})",
            self.provider_name(),
            session.instance_url
        );
        Ok(session)
    }
}

/// Check `signature == base64(HMAC-SHA256(client_secret, identity_url ‖ issued_at))`.
pub(crate) fn verify_token_signature(
    client_secret: &str,
    identity_url: &str,
    issued_at: &str,
    signature: &str,
) -> bool {
    let Ok(expected) = BASE64_STANDARD.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(client_secret.as_bytes()) else {
        return false;
    };
    mac.update(identity_url.as_bytes());
    mac.update(issued_at.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

fn soap_login_envelope(username: &str, password: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<env:Body><n1:login xmlns:n1="urn:partner.soap.sforce.com">"#,
            r"<n1:username>{}</n1:username><n1:password>{}</n1:password>",
            r"</n1:login></env:Body></env:Envelope>"
        ),
        xml_escape(username),
        xml_escape(password)
    )
}

/// Text content of the first `<tag>…</tag>` element.
///
/// Matches the local name, so `<sf:tag>` and `<tag xmlns="…">` are found
/// too; the closing tag must repeat the same prefix. Self-closing elements
/// are skipped.
fn extract_tag<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(found) = xml[from..].find(tag) {
        let name_start = from + found;
        let name_end = name_start + tag.len();
        from = name_end;

        let Some(lt) = xml[..name_start].rfind('<') else {
            continue;
        };
        let prefix = &xml[lt + 1..name_start];
        if !(prefix.is_empty() || is_namespace_prefix(prefix)) {
            continue;
        }

        let rest = &xml[name_end..];
        if !rest.starts_with(|c: char| c == '>' || c.is_ascii_whitespace()) {
            continue;
        }
        let gt = rest.find('>')?;
        if rest[..gt].ends_with('/') {
            continue;
        }

        let start = name_end + gt + 1;
        let close = format!("</{}>", &xml[lt + 1..name_end]);
        let end = xml[start..].find(&close)? + start;
        return Some(&xml[start..end]);
    }
    None
}

/// `ns:` with a non-empty XML name before the colon.
fn is_namespace_prefix(prefix: &str) -> bool {
    prefix.strip_suffix(':').is_some_and(|name| {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    })
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn xml_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
