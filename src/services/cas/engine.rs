//! Authentication engine: one ticket, one attempt, exactly one terminal state.
//!
//! Start -> NeedsRedirect                      (no ticket)
//! Start -> Validating -> Success|Fail|Error   (ticket present)
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::services::cas::config::CasConfig;
use crate::services::cas::context::RequestContext;
use crate::services::cas::error::{CasError, ConfigError, ParseError, Rejection};
use crate::services::cas::parser;
use crate::services::cas::service_url;
use crate::services::cas::transport::{HttpTransport, Transport};
use crate::services::cas::validation;
use crate::services::cas::verify::{Verdict, Verify};
use crate::services::cas::version::{self, ResolvedVersion};

/// Where to send the browser when no ticket is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectInstruction {
    pub url: String,
}

/// Why an attempt failed (as opposed to erroring).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    // The SSO server declined the ticket.
    Rejected(Rejection),
    // The verify step declined the principal.
    Declined { info: Option<String> },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Rejected(rejection) => fmt::Display::fmt(rejection, f),
            Failure::Declined { info: Some(info) } => write!(f, "declined: {}", info),
            Failure::Declined { info: None } => f.write_str("declined"),
        }
    }
}

#[derive(Debug)]
pub enum Outcome<U> {
    Success { user: U, info: Option<String> },
    Fail(Failure),
    Error(CasError),
}

#[derive(Debug)]
pub enum Authentication<U> {
    Redirect(RedirectInstruction),
    Completed(Outcome<U>),
}

/// Capability interface implemented by the host framework adapter.
pub trait Responder<U> {
    type Output;

    fn success(self, user: U, info: Option<String>) -> Self::Output;
    fn fail(self, failure: Failure) -> Self::Output;
    fn error(self, cause: CasError) -> Self::Output;
    fn redirect(self, url: String) -> Self::Output;
}

impl<U> Authentication<U> {
    pub fn respond<R: Responder<U>>(self, responder: R) -> R::Output {
        match self {
            Authentication::Redirect(redirect) => responder.redirect(redirect.url),
            Authentication::Completed(Outcome::Success { user, info }) => {
                responder.success(user, info)
            }
            Authentication::Completed(Outcome::Fail(failure)) => responder.fail(failure),
            Authentication::Completed(Outcome::Error(cause)) => responder.error(cause),
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOptions {
    // Extra parameters for the login redirect (`renew`, `gateway`, ...). Empty values are skipped.
    pub login_params: Vec<(String, String)>,
}

pub struct CasClient<V> {
    config: Arc<CasConfig>,
    resolved: ResolvedVersion,
    transport: Arc<dyn Transport>,
    verify: V,
}

impl<V> fmt::Debug for CasClient<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasClient")
            .field("config", &self.config)
            .field("resolved", &self.resolved)
            .finish()
    }
}

pub struct CasClientBuilder<V> {
    config: CasConfig,
    transport: Option<Arc<dyn Transport>>,
    verify: Option<V>,
}

impl<V: Verify> CasClientBuilder<V> {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn verify(mut self, verify: V) -> Self {
        self.verify = Some(verify);
        self
    }

    pub fn build(self) -> Result<CasClient<V>, CasError> {
        let verify = self.verify.ok_or(ConfigError::Missing("verify"))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::new().map_err(|_| ConfigError::Invalid("transport"))?,
            ),
        };

        let resolved = version::resolve(self.config.version(), self.config.validate_url());

        Ok(CasClient {
            config: Arc::new(self.config),
            resolved,
            transport,
            verify,
        })
    }
}

impl<V: Verify> CasClient<V> {
    pub fn builder(config: CasConfig) -> CasClientBuilder<V> {
        CasClientBuilder {
            config,
            transport: None,
            verify: None,
        }
    }

    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    pub fn resolved(&self) -> &ResolvedVersion {
        &self.resolved
    }

    pub fn service_url(&self, ctx: &RequestContext) -> Result<String, CasError> {
        service_url::build(&self.config, ctx)
    }

    /// `{sso_base_url}/login?...&service=<service>`.
    pub fn login_url(
        &self,
        ctx: &RequestContext,
        service: &str,
        options: &AuthenticateOptions,
    ) -> Result<String, CasError> {
        let mut url = Url::parse(&format!("{}/login", self.config.sso_base_url()))?;
        let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        if self.config.copy_query_parameters() {
            params.extend(
                ctx.query()
                    .into_iter()
                    .filter(|(k, _)| k != "ticket" && k != "service"),
            );
        }

        set_param(&mut params, "service", service);
        for (key, value) in &options.login_params {
            if !value.is_empty() {
                set_param(&mut params, key, value);
            }
        }

        url.query_pairs_mut().clear().extend_pairs(params);
        Ok(url.to_string())
    }

    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        options: &AuthenticateOptions,
    ) -> Authentication<V::User> {
        let service = match self.service_url(ctx) {
            Ok(service) => service,
            Err(err) => {
                warn!(error = %err, "could not derive service url");
                return Authentication::Completed(Outcome::Error(err));
            }
        };

        let Some(ticket) = ctx.ticket() else {
            return match self.login_url(ctx, &service, options) {
                Ok(url) => {
                    debug!(service = %service, "no ticket, redirecting to cas login");
                    Authentication::Redirect(RedirectInstruction { url })
                }
                Err(err) => Authentication::Completed(Outcome::Error(err)),
            };
        };

        Authentication::Completed(self.validate(&ticket, &service).await)
    }

    /// Validate `ticket` for `service` and run the verify step.
    pub async fn validate(&self, ticket: &str, service: &str) -> Outcome<V::User> {
        let request = match validation::build(&self.config, &self.resolved, ticket, service) {
            Ok(request) => request,
            Err(err) => return Outcome::Error(err),
        };

        debug!(
            version = %self.resolved.version,
            endpoint = %request.url.path(),
            "validating service ticket"
        );

        let body = match self.transport.send(&request).await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "ticket validation request failed");
                return Outcome::Error(CasError::Network(err));
            }
        };

        let principal = match parser::parse(self.resolved.parser, &body) {
            Ok(principal) => principal,
            Err(ParseError::Rejected(rejection)) => {
                info!(
                    code = rejection.code.as_deref().unwrap_or("-"),
                    "cas server rejected ticket"
                );
                return Outcome::Fail(Failure::Rejected(rejection));
            }
            Err(err @ ParseError::Malformed(_)) => {
                warn!(version = %self.resolved.version, error = %err, "malformed cas response");
                return Outcome::Error(err.into());
            }
        };

        match self.verify.verify(principal).await {
            Ok(Verdict::Accept { user, info }) => Outcome::Success { user, info },
            Ok(Verdict::Reject { info }) => Outcome::Fail(Failure::Declined { info }),
            Err(cause) => {
                warn!(error = %cause, "verify step failed");
                Outcome::Error(CasError::VerifyFailed(cause))
            }
        }
    }
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    params.retain(|(k, _)| k != key);
    params.push((key.to_string(), value.to_string()));
}
