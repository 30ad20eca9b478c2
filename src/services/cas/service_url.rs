//! Canonical `service` URL: the callback CAS redirects back to.
//!
//! The same value must be sent at redirect time and at validation time, so this
//! is a pure projection of configuration + request snapshot.
use url::Url;

use crate::services::cas::config::CasConfig;
use crate::services::cas::context::RequestContext;
use crate::services::cas::error::CasError;

pub fn build(config: &CasConfig, ctx: &RequestContext) -> Result<String, CasError> {
    let base = Url::parse(&origin(config, ctx))?;

    let target = config
        .callback_url()
        .unwrap_or(ctx.original_url.as_str());

    let mut url = base.join(target)?;
    strip_ticket(&mut url);
    Ok(url.to_string())
}

/// Base origin, in priority order:
/// configured server base URL, `X-Forwarded-Host` (+ `X-Forwarded-Proto`),
/// `Host` + request scheme, hostname + request scheme.
pub fn origin(config: &CasConfig, ctx: &RequestContext) -> String {
    if let Some(base) = config.server_base_url() {
        return base.to_string();
    }

    if let Some(host) = first_value(&ctx.forwarded_host) {
        // Proxies that do not send a proto are assumed to speak plain http.
        let proto = first_value(&ctx.forwarded_proto).unwrap_or("http");
        return format!("{}://{}", proto, host);
    }

    if let Some(host) = ctx.host.as_deref().filter(|h| !h.is_empty()) {
        return format!("{}://{}", ctx.scheme, host);
    }

    format!("{}://{}", ctx.scheme, ctx.hostname)
}

/// Remove every `ticket` query parameter and the fragment.
///
/// The remaining query is always re-serialized, so the value is the same
/// whether or not a ticket was present (redirect time vs validation time).
pub fn strip_ticket(url: &mut Url) {
    url.set_fragment(None);

    if url.query().is_none() {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| k != "ticket")
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

// First header wins, then the first entry of its comma list.
fn first_value(values: &[String]) -> Option<&str> {
    values
        .first()
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
