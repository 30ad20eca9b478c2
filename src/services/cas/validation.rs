//! Outbound ticket validation request.
use chrono::{SecondsFormat, Utc};
use url::Url;
use uuid::Uuid;

use crate::services::cas::config::CasConfig;
use crate::services::cas::error::CasError;
use crate::services::cas::version::{ParserKind, ResolvedVersion};

pub const CONTENT_TYPE_XML: &str = "text/xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request sent server-to-server to the CAS validation endpoint.
///
/// Built fresh for every attempt; the SAML request id and issue instant are
/// never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub content_type: &'static str,
    pub body: Option<String>,
}

impl ValidationRequest {
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

pub fn build(
    config: &CasConfig,
    resolved: &ResolvedVersion,
    ticket: &str,
    service: &str,
) -> Result<ValidationRequest, CasError> {
    let mut url = endpoint_url(config.sso_base_url(), &resolved.endpoint)?;

    match resolved.parser {
        ParserKind::Saml => {
            url.query_pairs_mut().append_pair("TARGET", service);

            let request_id = Uuid::new_v4().to_string();
            let issue_instant = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

            Ok(ValidationRequest {
                method: HttpMethod::Post,
                url,
                content_type: CONTENT_TYPE_XML,
                body: Some(saml_envelope(&request_id, &issue_instant, ticket)),
            })
        }
        ParserKind::PlainText | ParserKind::ServiceResponse => {
            url.query_pairs_mut()
                .append_pair("ticket", ticket)
                .append_pair("service", service);

            // CAS1.0 answers in plain text; the header is kept for servers that expect it.
            Ok(ValidationRequest {
                method: HttpMethod::Get,
                url,
                content_type: CONTENT_TYPE_XML,
                body: None,
            })
        }
    }
}

/// `sso_base_url` + endpoint path. An absolute endpoint is taken as is.
pub fn endpoint_url(sso_base_url: &str, endpoint: &str) -> Result<Url, CasError> {
    if let Ok(url) = Url::parse(endpoint) {
        if url.has_host() {
            return Ok(url);
        }
    }

    let base = sso_base_url.trim_end_matches('/');
    let joined = if endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    };
    Ok(Url::parse(&joined)?)
}

/// SOAP 1.1 envelope carrying a SAMLP 1.1 `<Request>` for `ticket`.
pub fn saml_envelope(request_id: &str, issue_instant: &str, ticket: &str) -> String {
    format!(
        concat!(
            r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<SOAP-ENV:Header/><SOAP-ENV:Body>"#,
            r#"<samlp:Request xmlns:samlp="urn:oasis:names:tc:SAML:1.0:protocol" "#,
            r#"MajorVersion="1" MinorVersion="1" RequestID="{}" IssueInstant="{}">"#,
            r#"<samlp:AssertionArtifact>{}</samlp:AssertionArtifact>"#,
            r#"</samlp:Request></SOAP-ENV:Body></SOAP-ENV:Envelope>"#,
        ),
        quick_xml::escape::escape(request_id),
        quick_xml::escape::escape(issue_instant),
        quick_xml::escape::escape(ticket),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cas::version::{Version, resolve};

    fn config(version: Version) -> CasConfig {
        CasConfig::builder(version, "https://sso.example.edu/cas")
            .build()
            .unwrap()
    }

    #[test]
    fn cas2_is_a_get_with_ticket_and_service() {
        let config = config(Version::Cas2);
        let resolved = resolve(Version::Cas2, None);
        let req = build(&config, &resolved, "ST-1", "http://app/cas?next=a").unwrap();

        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url.path(), "/cas/serviceValidate");
        assert_eq!(req.query_param("ticket").as_deref(), Some("ST-1"));
        assert_eq!(
            req.query_param("service").as_deref(),
            Some("http://app/cas?next=a")
        );
        assert_eq!(req.content_type, "text/xml");
        assert!(req.body.is_none());
    }

    #[test]
    fn saml_is_a_post_with_target_and_envelope() {
        let config = config(Version::Cas3Saml);
        let resolved = resolve(Version::Cas3Saml, None);
        let req = build(&config, &resolved, "ST-2", "http://app/cas").unwrap();

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url.path(), "/cas/samlValidate");
        assert_eq!(req.query_param("TARGET").as_deref(), Some("http://app/cas"));
        assert_eq!(req.query_param("ticket"), None);

        let body = req.body.unwrap();
        assert!(body.starts_with("<SOAP-ENV:Envelope"));
        assert!(body.contains("<samlp:AssertionArtifact>ST-2</samlp:AssertionArtifact>"));
        assert!(body.contains(r#"MajorVersion="1" MinorVersion="1""#));
    }

    #[test]
    fn saml_request_ids_are_fresh() {
        let config = config(Version::Cas2Saml);
        let resolved = resolve(Version::Cas2Saml, None);
        let a = build(&config, &resolved, "ST-3", "http://app/").unwrap();
        let b = build(&config, &resolved, "ST-3", "http://app/").unwrap();
        assert_ne!(a.body, b.body);
    }

    #[test]
    fn envelope_escapes_ticket() {
        let body = saml_envelope("id-1", "2024-01-01T00:00:00.000Z", "ST-<1>&");
        assert!(body.contains(r#"RequestID="id-1" IssueInstant="2024-01-01T00:00:00.000Z""#));
        assert!(body.contains("ST-&lt;1&gt;&amp;"));
    }

    #[test]
    fn validate_url_override() {
        let resolved = resolve(Version::Cas1, Some("https://other.example.edu/check"));
        let req = build(&config(Version::Cas1), &resolved, "ST-4", "http://app/").unwrap();
        assert_eq!(req.url.host_str(), Some("other.example.edu"));
        assert_eq!(req.url.path(), "/check");

        assert_eq!(
            endpoint_url("https://sso.example.edu/cas", "proxyValidate")
                .unwrap()
                .as_str(),
            "https://sso.example.edu/cas/proxyValidate"
        );
    }
}
