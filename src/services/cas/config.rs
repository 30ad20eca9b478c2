//! Immutable per-integration configuration.
//!
//! Constructed once at setup; shared read-only by every authentication attempt.
use url::Url;

use crate::services::cas::error::ConfigError;
use crate::services::cas::version::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasConfig {
    version: Version,
    sso_base_url: String,
    server_base_url: Option<String>,
    validate_url: Option<String>,
    callback_url: Option<String>,
    copy_query_parameters: bool,
}

impl CasConfig {
    pub fn builder(version: Version, sso_base_url: impl Into<String>) -> CasConfigBuilder {
        CasConfigBuilder {
            version,
            sso_base_url: sso_base_url.into(),
            server_base_url: None,
            validate_url: None,
            callback_url: None,
            copy_query_parameters: true,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// SSO base URL without a trailing slash, e.g. `https://sso.example.edu/cas`.
    pub fn sso_base_url(&self) -> &str {
        &self.sso_base_url
    }

    pub fn server_base_url(&self) -> Option<&str> {
        self.server_base_url.as_deref()
    }

    pub fn validate_url(&self) -> Option<&str> {
        self.validate_url.as_deref()
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    pub fn copy_query_parameters(&self) -> bool {
        self.copy_query_parameters
    }
}

#[derive(Debug, Clone)]
pub struct CasConfigBuilder {
    version: Version,
    sso_base_url: String,
    server_base_url: Option<String>,
    validate_url: Option<String>,
    callback_url: Option<String>,
    copy_query_parameters: bool,
}

impl CasConfigBuilder {
    pub fn server_base_url(mut self, value: impl Into<String>) -> Self {
        self.server_base_url = Some(value.into());
        self
    }

    pub fn validate_url(mut self, value: impl Into<String>) -> Self {
        self.validate_url = Some(value.into());
        self
    }

    pub fn callback_url(mut self, value: impl Into<String>) -> Self {
        self.callback_url = Some(value.into());
        self
    }

    pub fn copy_query_parameters(mut self, value: bool) -> Self {
        self.copy_query_parameters = value;
        self
    }

    pub fn build(self) -> Result<CasConfig, ConfigError> {
        let sso_base_url = self.sso_base_url.trim().trim_end_matches('/').to_string();
        if sso_base_url.is_empty() {
            return Err(ConfigError::Missing("sso_base_url"));
        }
        Url::parse(&sso_base_url).map_err(|_| ConfigError::Invalid("sso_base_url"))?;

        // Empty strings behave like "not configured".
        let server_base_url = non_empty(self.server_base_url);
        if let Some(base) = server_base_url.as_deref() {
            Url::parse(base).map_err(|_| ConfigError::Invalid("server_base_url"))?;
        }

        Ok(CasConfig {
            version: self.version,
            sso_base_url,
            server_base_url,
            validate_url: non_empty(self.validate_url),
            callback_url: non_empty(self.callback_url),
            copy_query_parameters: self.copy_query_parameters,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
