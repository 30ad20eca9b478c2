//! Error taxonomy of the CAS client.
//!
//! Only `ConfigError` (and `UnsupportedVersion` while parsing configuration)
//! escapes to callers as a hard failure. Everything that can go wrong during a
//! single authentication attempt is folded into an `Outcome` by the engine.
use std::fmt;

use serde::Serialize;

use crate::services::cas::transport::TransportError;
use crate::services::cas::verify::BoxError;

/// Setup-time configuration problems. Never produced at request time.
///
/// thiserror を使わない理由:
/// - キー名だけを持つ単純なエラーなので
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The SSO server explicitly declined the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    // Server-provided code, e.g. `INVALID_TICKET` or `samlp:Requester`.
    pub code: Option<String>,
    pub message: String,
}

impl Rejection {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "authentication failed {}: {}", code, self.message),
            None => write!(f, "authentication failed: {}", self.message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CasError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("unsupported version {0}")]
    UnsupportedVersion(String),

    #[error("the response from the server was bad: {0}")]
    MalformedResponse(String),

    /// Only produced when a parser result is converted with `?`/`into()`.
    /// `CasClient` reports rejections as `Outcome::Fail(Failure::Rejected)`.
    #[error("{0}")]
    AuthenticationRejected(Rejection),

    #[error("error in validation")]
    Network(#[source] TransportError),

    #[error("user-provided verify function failed")]
    VerifyFailed(#[source] BoxError),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Failure of a response parser. Rejections are legitimate denials,
/// malformed bodies point at a broken SSO integration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Rejected(Rejection),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ParseError {
    pub fn rejected(code: Option<String>, message: impl Into<String>) -> Self {
        Self::Rejected(Rejection::new(code, message))
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

impl From<ParseError> for CasError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Rejected(rejection) => CasError::AuthenticationRejected(rejection),
            ParseError::Malformed(message) => CasError::MalformedResponse(message),
        }
    }
}
