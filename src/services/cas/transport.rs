//! Transport collaborator: "send the validation request, hand back the raw body".
//!
//! The core never retries and imposes no timeout of its own; `HttpTransport`
//! carries the timeout.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::services::cas::validation::{HttpMethod, ValidationRequest};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cas server answered {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ValidationRequest) -> Result<String, TransportError>;
}

/// reqwest-backed transport. Non-2xx answers are failures.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("http client setup failed: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ValidationRequest) -> Result<String, TransportError> {
        // Only scheme/host/path go into errors: the query holds the ticket.
        let target = redact(request);

        let builder = match request.method {
            HttpMethod::Get => self.client.get(request.url.clone()),
            HttpMethod::Post => self.client.post(request.url.clone()),
        };
        let mut builder = builder.header(CONTENT_TYPE, request.content_type);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|source| TransportError::Http {
            url: target.clone(),
            source: source.without_url(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: target,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| TransportError::Http {
            url: target,
            source: source.without_url(),
        })
    }
}

fn redact(request: &ValidationRequest) -> String {
    let mut url = request.url.clone();
    url.set_query(None);
    url.to_string()
}
