/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, CAS_* など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::cas::{CasConfig, ConfigError, Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub cas: CasConfig,
    // Applied by the HTTP transport; the CAS core itself never times out.
    pub cas_http_timeout: Duration,
    // Empty: every CAS-authenticated user is accepted.
    pub cas_allowed_users: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let version = match std::env::var("CAS_VERSION") {
            Ok(v) => Version::from_str(&v).map_err(|_| ConfigError::Invalid("CAS_VERSION"))?,
            Err(_) => Version::Cas1,
        };

        let sso_base_url = std::env::var("CAS_SSO_BASE_URL")
            .map_err(|_| ConfigError::Missing("CAS_SSO_BASE_URL"))?;

        let mut cas = CasConfig::builder(version, sso_base_url);
        if let Ok(v) = std::env::var("CAS_SERVER_BASE_URL") {
            cas = cas.server_base_url(v);
        }
        if let Ok(v) = std::env::var("CAS_VALIDATE_URL") {
            cas = cas.validate_url(v);
        }
        if let Ok(v) = std::env::var("CAS_CALLBACK_URL") {
            cas = cas.callback_url(v);
        }
        if let Ok(v) = std::env::var("CAS_COPY_QUERY_PARAMETERS") {
            let copy = parse_bool(&v).ok_or(ConfigError::Invalid("CAS_COPY_QUERY_PARAMETERS"))?;
            cas = cas.copy_query_parameters(copy);
        }
        let cas = cas.build()?;

        let cas_http_timeout = std::env::var("CAS_HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        let cas_allowed_users = std::env::var("CAS_ALLOWED_USERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        Ok(Self {
            addr,
            app_env,
            cas,
            cas_http_timeout,
            cas_allowed_users,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
