use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;
use url::Url;

use cas_client::api;
use cas_client::services::cas::{
    AuthenticateOptions, Authentication, CasClient, CasConfig, CasError, Done, Failure,
    HttpMethod, Outcome, Principal, RequestContext, Transport, TransportError, ValidationRequest,
    Version, verify_fn,
};
use cas_client::services::user_directory::UserDirectory;
use cas_client::state::AppState;

const SSO: &str = "https://sso.example.edu/cas";

struct Recording {
    body: String,
    sent: Mutex<Vec<ValidationRequest>>,
}

impl Recording {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<ValidationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Recording {
    async fn send(&self, request: &ValidationRequest) -> Result<String, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(self.body.clone())
    }
}

fn config(version: Version) -> CasConfig {
    CasConfig::builder(version, SSO).build().unwrap()
}

#[tokio::test]
async fn redirect_then_validate_uses_the_same_service() {
    let transport = Recording::new(
        "<cas:serviceResponse xmlns:cas=\"http://www.yale.edu/tp/cas\"><cas:authenticationSuccess><cas:user>chip</cas:user></cas:authenticationSuccess></cas:serviceResponse>",
    );
    let client = CasClient::builder(config(Version::Cas3))
        .transport(transport.clone())
        .verify(verify_fn(|p: Principal, done: Done<String>| {
            done.success(p.user, Some("welcome".into()))
        }))
        .build()
        .unwrap();

    let first = RequestContext::new("http", "internal", "/app/cas?next=%2Fhome")
        .with_forwarded_host("a.com, b.com")
        .with_forwarded_proto("https, http");

    let login = match client.authenticate(&first, &AuthenticateOptions::default()).await {
        Authentication::Redirect(r) => Url::parse(&r.url).unwrap(),
        other => panic!("expected redirect, got {other:?}"),
    };
    assert!(login.as_str().starts_with("https://sso.example.edu/cas/login?"));
    let service = login
        .query_pairs()
        .find(|(k, _)| k == "service")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(service, "https://a.com/app/cas?next=%2Fhome");
    assert!(transport.sent().is_empty());

    // CAS sends the browser back with a ticket appended.
    let back = RequestContext::new("http", "internal", "/app/cas?next=%2Fhome&ticket=ST-42")
        .with_forwarded_host("a.com, b.com")
        .with_forwarded_proto("https, http");

    match client.authenticate(&back, &AuthenticateOptions::default()).await {
        Authentication::Completed(Outcome::Success { user, info }) => {
            assert_eq!(user, "chip");
            assert_eq!(info.as_deref(), Some("welcome"));
        }
        other => panic!("expected success, got {other:?}"),
    }

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Get);
    assert_eq!(sent[0].url.path(), "/cas/p3/serviceValidate");
    assert_eq!(sent[0].query_param("service"), Some(service));
    assert_eq!(sent[0].query_param("ticket").as_deref(), Some("ST-42"));
}

#[tokio::test]
async fn saml_validation_posts_envelope_and_reads_attributes() {
    let transport = Recording::new(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body>
<Response xmlns="urn:oasis:names:tc:SAML:1.0:protocol"><Status><StatusCode Value="samlp:Success"/></Status>
<Assertion><AttributeStatement><Attribute AttributeName="E-Mail"><AttributeValue>chip@example.edu</AttributeValue></Attribute></AttributeStatement>
<AuthenticationStatement><Subject><NameIdentifier>chip</NameIdentifier></Subject></AuthenticationStatement></Assertion>
</Response></SOAP-ENV:Body></SOAP-ENV:Envelope>"#,
    );
    let client = CasClient::builder(config(Version::Cas2Saml))
        .transport(transport.clone())
        .verify(verify_fn(|p: Principal, done: Done<Principal>| {
            done.success(p, None)
        }))
        .build()
        .unwrap();

    let ctx = RequestContext::new("https", "app.example.com", "/cas?ticket=ST-7");
    let principal = match client.authenticate(&ctx, &AuthenticateOptions::default()).await {
        Authentication::Completed(Outcome::Success { user, .. }) => user,
        other => panic!("expected success, got {other:?}"),
    };
    assert_eq!(principal.user, "chip");
    assert_eq!(principal.attribute("e-mail"), Some("chip@example.edu"));

    let sent = transport.sent();
    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(sent[0].url.path(), "/cas/samlValidate");
    assert_eq!(
        sent[0].query_param("TARGET").as_deref(),
        Some("https://app.example.com/cas")
    );
    let body = sent[0].body.as_deref().unwrap();
    assert!(body.contains("<samlp:AssertionArtifact>ST-7</samlp:AssertionArtifact>"));
}

#[tokio::test]
async fn verify_error_is_never_downgraded_to_fail() {
    let client = CasClient::builder(config(Version::Cas1))
        .transport(Recording::new("yes\nchip\n"))
        .verify(verify_fn(|_p: Principal, done: Done<String>| {
            done.error(std::io::Error::other("directory offline"))
        }))
        .build()
        .unwrap();

    let ctx = RequestContext::new("http", "app", "/cas?ticket=ST-1");
    match client.authenticate(&ctx, &AuthenticateOptions::default()).await {
        Authentication::Completed(Outcome::Error(CasError::VerifyFailed(cause))) => {
            assert_eq!(cause.to_string(), "directory offline");
        }
        other => panic!("expected verify error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_ticket_is_a_fail_with_code() {
    let client = CasClient::builder(config(Version::Cas2))
        .transport(Recording::new(
            r#"<cas:serviceResponse><cas:authenticationFailure code="INVALID_TICKET">Ticket ST-1 not recognized</cas:authenticationFailure></cas:serviceResponse>"#,
        ))
        .verify(verify_fn(|p: Principal, done: Done<String>| done.success(p.user, None)))
        .build()
        .unwrap();

    let ctx = RequestContext::new("http", "app", "/cas?ticket=ST-1");
    match client.authenticate(&ctx, &AuthenticateOptions::default()).await {
        Authentication::Completed(Outcome::Fail(Failure::Rejected(r))) => {
            assert_eq!(r.code.as_deref(), Some("INVALID_TICKET"));
        }
        other => panic!("expected fail, got {other:?}"),
    }
}

fn app(body: &str) -> axum::Router {
    let cas = CasClient::builder(config(Version::Cas1))
        .transport(Recording::new(body))
        .verify(UserDirectory::new())
        .build()
        .unwrap();
    api::v1::routes().with_state(AppState::new(Arc::new(cas)))
}

#[tokio::test]
async fn http_login_redirects_without_ticket() {
    let res = app("yes\nchip")
        .oneshot(
            Request::builder()
                .uri("/cas")
                .header(header::HOST, "localhost:9000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "https://sso.example.edu/cas/login?service=http%3A%2F%2Flocalhost%3A9000%2Fcas"
    );
}

#[tokio::test]
async fn http_login_with_ticket_returns_user() {
    let res = app("yes\nchip")
        .oneshot(
            Request::builder()
                .uri("/cas?ticket=ST-1")
                .header(header::HOST, "localhost:9000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), 64 * 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["auth"], true);
    assert_eq!(json["user"]["netId"], "chip");
}

#[tokio::test]
async fn http_login_rejected_is_401() {
    let res = app("no\n\n")
        .oneshot(
            Request::builder()
                .uri("/cas?ticket=ST-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
