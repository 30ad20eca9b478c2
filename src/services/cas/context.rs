//! Read-only snapshot of the incoming request, as far as the CAS handshake
//! cares about it.
use axum::http::{HeaderMap, Uri, header};

pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    // `http` or `https` as seen by the application itself.
    pub scheme: String,
    // Resolved hostname (no port). Last-resort origin.
    pub hostname: String,
    pub host: Option<String>,
    // Header values in arrival order; each value may itself be a comma list.
    pub forwarded_host: Vec<String>,
    pub forwarded_proto: Vec<String>,
    // Path + query exactly as requested, e.g. `/cas?ticket=ST-1`.
    pub original_url: String,
}

impl RequestContext {
    pub fn new(
        scheme: impl Into<String>,
        hostname: impl Into<String>,
        original_url: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            hostname: hostname.into(),
            original_url: original_url.into(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_forwarded_host(mut self, value: impl Into<String>) -> Self {
        self.forwarded_host.push(value.into());
        self
    }

    pub fn with_forwarded_proto(mut self, value: impl Into<String>) -> Self {
        self.forwarded_proto.push(value.into());
        self
    }

    /// Snapshot an HTTP request.
    ///
    /// `scheme` is what the listener terminated (axum does not know it on its own).
    pub fn from_http(scheme: &str, headers: &HeaderMap, uri: &Uri) -> Self {
        let host = header_values(headers, header::HOST.as_str()).into_iter().next();

        let hostname = uri
            .host()
            .map(str::to_string)
            .or_else(|| host.as_deref().map(strip_port))
            .unwrap_or_else(|| "localhost".to_string());

        let original_url = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Self {
            scheme: uri.scheme_str().unwrap_or(scheme).to_string(),
            hostname,
            host,
            forwarded_host: header_values(headers, X_FORWARDED_HOST),
            forwarded_proto: header_values(headers, X_FORWARDED_PROTO),
            original_url,
        }
    }

    /// Query parameters of the original URL, in order, duplicates kept.
    pub fn query(&self) -> Vec<(String, String)> {
        let without_fragment = self.original_url.split('#').next().unwrap_or_default();
        match without_fragment.split_once('?') {
            Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// The service ticket, if the SSO server just sent the browser back.
    /// An empty `ticket=` counts as absent.
    pub fn ticket(&self) -> Option<String> {
        self.query_param("ticket").filter(|t| !t.is_empty())
    }
}

fn header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

fn strip_port(host: &str) -> String {
    // `[::1]:8080` keeps its brackets.
    match host.rsplit_once(':') {
        Some((name, port)) if !name.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            name.to_string()
        }
        _ => host.to_string(),
    }
}
