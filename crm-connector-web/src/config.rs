//! Gateway configuration
//!
//! Loaded once at startup from an optional TOML file, then overridden by
//! environment variables. Any missing credential for the selected auth mode
//! is a fatal [`ConfigError`].

use std::path::{Path, PathBuf};

use crm_connector_provider::{
    DEFAULT_LOGIN_URL, OAuthAppCredentials, PasswordCredentials, ProviderCredentials,
};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_PATH_ENV: &str = "CRM_CONNECTOR_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Maximum accepted JSON body, in bytes.
    pub body_limit: usize,
    /// Seconds in-flight requests get to finish after a stop signal.
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    /// Daily rolling log files are written here when set.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub credentials: ProviderCredentials,
    pub login_url: String,
    /// Mark the session cookie `Secure` (deployments behind HTTPS).
    pub cookie_secure: bool,
    pub log: LogConfig,
}

// ============ TOML layer ============

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    server: FileServer,
    auth: FileAuth,
    log: FileLog,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileServer {
    host: Option<String>,
    port: Option<u16>,
    workers: Option<usize>,
    body_limit: Option<usize>,
    shutdown_timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileAuth {
    mode: Option<String>,
    login_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    security_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    cookie_secure: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileLog {
    level: Option<String>,
    format: Option<String>,
    directory: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ============ Resolution ============

/// Environment value, with blank treated as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    non_empty(value)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value: v })
        })
        .transpose()
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    match non_empty(value) {
        None => Ok(None),
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
    }
}

impl AppConfig {
    /// Load from the process environment and the optional config file.
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();

        let file = match non_empty(env(CONFIG_PATH_ENV)) {
            Some(path) => FileConfig::from_path(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                FileConfig::from_path(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => FileConfig::default(),
        };

        Self::from_sources(file, env)
    }

    /// Merge a parsed file with an environment lookup; environment wins.
    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let FileConfig { server, auth, log } = file;

        let server = ServerConfig {
            host: non_empty(env("HOST"))
                .or(server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_env("PORT", env("PORT"))?
                .or(server.port)
                .unwrap_or(8080),
            workers: parse_env("WORKERS", env("WORKERS"))?
                .or(server.workers)
                .unwrap_or_else(num_cpus::get)
                .max(1),
            body_limit: parse_env("BODY_LIMIT", env("BODY_LIMIT"))?
                .or(server.body_limit)
                .unwrap_or(64 * 1024),
            shutdown_timeout: parse_env("SHUTDOWN_TIMEOUT", env("SHUTDOWN_TIMEOUT"))?
                .or(server.shutdown_timeout)
                .unwrap_or(30),
        };

        let pick = |key: &str, file_value: Option<String>| {
            non_empty(env(key)).or_else(|| non_empty(file_value))
        };

        let client_id = pick("CLIENT_ID", auth.client_id);
        let mode = pick("AUTH_MODE", auth.mode);
        let mode_key = mode.as_deref().map(str::to_ascii_lowercase);
        let use_oauth = match mode_key.as_deref() {
            Some("oauth" | "oauth2") => true,
            Some("password") => false,
            Some(_) => {
                return Err(ConfigError::Invalid {
                    key: "AUTH_MODE",
                    value: mode.unwrap_or_default(),
                });
            }
            None => client_id.is_some(),
        };

        let credentials = if use_oauth {
            ProviderCredentials::OAuth(OAuthAppCredentials::new(
                client_id.ok_or(ConfigError::Missing("CLIENT_ID"))?,
                pick("CLIENT_SECRET", auth.client_secret)
                    .ok_or(ConfigError::Missing("CLIENT_SECRET"))?,
                pick("REDIRECT_URI", auth.redirect_uri)
                    .ok_or(ConfigError::Missing("REDIRECT_URI"))?,
            ))
        } else {
            ProviderCredentials::Password(PasswordCredentials::new(
                pick("USERNAME", auth.username).ok_or(ConfigError::Missing("USERNAME"))?,
                pick("PASSWORD", auth.password).ok_or(ConfigError::Missing("PASSWORD"))?,
                pick("SECURITY_TOKEN", auth.security_token)
                    .ok_or(ConfigError::Missing("SECURITY_TOKEN"))?,
            ))
        };

        let login_url =
            pick("LOGIN_URL", auth.login_url).unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string());
        if !(login_url.starts_with("https://") || login_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                key: "LOGIN_URL",
                value: login_url,
            });
        }

        let cookie_secure = parse_bool("COOKIE_SECURE", env("COOKIE_SECURE"))?
            .or(auth.cookie_secure)
            .unwrap_or(false);

        let format = match pick("LOG_FORMAT", log.format)
            .as_deref()
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        let log = LogConfig {
            level: pick("LOG_LEVEL", log.level).unwrap_or_else(|| "info".to_string()),
            format,
            directory: non_empty(env("LOG_DIR"))
                .map(PathBuf::from)
                .or(log.directory),
        };

        Ok(Self {
            server,
            credentials,
            login_url,
            cookie_secure,
            log,
        })
    }

    /// `"password"` or `"oauth2"`.
    pub fn auth_type(&self) -> &'static str {
        self.credentials.auth_type()
    }
}
