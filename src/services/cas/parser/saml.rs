//! SAML 1.1 validation response (SOAP-wrapped `<samlp:Response>`).
use crate::services::cas::error::ParseError;
use crate::services::cas::parser::xml::Element;
use crate::services::cas::principal::Principal;

pub fn parse(body: &str) -> Result<Principal, ParseError> {
    let root = Element::parse(body).map_err(|e| ParseError::malformed(e.to_string()))?;

    // Past this point every missing node is a denial, not an integration error.
    let response = Some(&root)
        .filter(|r| r.name() == "envelope")
        .and_then(|r| r.path(&["body", "response"]))
        .ok_or_else(|| rejected(None, "no SAML response in envelope"))?;

    let status = response
        .path(&["status", "statuscode"])
        .and_then(|code| code.attr("Value"));

    match status {
        Some(value) if value.ends_with("Success") => {}
        other => {
            return Err(rejected(
                other.map(str::to_string),
                "authentication failed",
            ));
        }
    }

    let assertion = response
        .child("assertion")
        .ok_or_else(|| rejected(None, "response without assertion"))?;

    let user = assertion
        .path(&["authenticationstatement", "subject", "nameidentifier"])
        .map(Element::text)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| rejected(None, "assertion without name identifier"))?;

    let mut principal = Principal::new(user);

    let statement = assertion
        .child("attributestatement")
        .ok_or_else(|| rejected(None, "assertion without attribute statement"))?;

    for attribute in statement.children_named("attribute") {
        let name = attribute
            .attr("AttributeName")
            .ok_or_else(|| rejected(None, "attribute without AttributeName"))?;

        for value in attribute.children_named("attributevalue") {
            principal.push_attribute(name, value.text());
        }
    }

    Ok(principal)
}

fn rejected(code: Option<String>, message: &str) -> ParseError {
    ParseError::rejected(code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS: &str = r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Header/>
  <SOAP-ENV:Body>
    <Response xmlns="urn:oasis:names:tc:SAML:1.0:protocol" MajorVersion="1" MinorVersion="1" ResponseID="_5ae2">
      <Status><StatusCode Value="samlp:Success"></StatusCode></Status>
      <Assertion xmlns="urn:oasis:names:tc:SAML:1.0:assertion" AssertionID="_e5c2" MajorVersion="1" MinorVersion="1">
        <AttributeStatement>
          <Subject><NameIdentifier>chip</NameIdentifier></Subject>
          <Attribute AttributeName="E-Mail" AttributeNamespace="http://www.ja-sig.org/products/cas/">
            <AttributeValue>chip@example.edu</AttributeValue>
          </Attribute>
          <Attribute AttributeName="eduPersonAffiliation" AttributeNamespace="http://www.ja-sig.org/products/cas/">
            <AttributeValue>faculty</AttributeValue>
            <AttributeValue>staff</AttributeValue>
          </Attribute>
        </AttributeStatement>
        <AuthenticationStatement AuthenticationInstant="2008-12-10T14:12:14.817Z" AuthenticationMethod="urn:oasis:names:tc:SAML:1.0:am:password">
          <Subject><NameIdentifier>chip</NameIdentifier></Subject>
        </AuthenticationStatement>
      </Assertion>
    </Response>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    #[test]
    fn success_with_attributes() {
        let p = parse(SUCCESS).unwrap();
        assert_eq!(p.user, "chip");
        assert_eq!(p.attribute("e-mail"), Some("chip@example.edu"));
        assert!(p.attributes.contains_key("e-mail"));
        assert!(!p.attributes.contains_key("E-Mail"));
        assert_eq!(
            p.attribute_values("edupersonaffiliation"),
            ["faculty", "staff"]
        );
    }

    #[test]
    fn non_success_status_is_rejected() {
        let body = SUCCESS.replace("samlp:Success", "samlp:Requester");
        match parse(&body) {
            Err(ParseError::Rejected(r)) => assert_eq!(r.code.as_deref(), Some("samlp:Requester")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn success_match_is_case_sensitive_suffix() {
        let body = SUCCESS.replace("samlp:Success", "samlp:success");
        assert!(matches!(parse(&body), Err(ParseError::Rejected(_))));
    }

    #[test]
    fn missing_nodes_are_rejections() {
        let no_subject = SUCCESS.replace(
            "<Subject><NameIdentifier>chip</NameIdentifier></Subject>\n        </AuthenticationStatement>",
            "</AuthenticationStatement>",
        );
        assert!(matches!(parse(&no_subject), Err(ParseError::Rejected(_))));

        let not_soap = "<Response><Status/></Response>";
        assert!(matches!(parse(not_soap), Err(ParseError::Rejected(_))));
    }

    #[test]
    fn missing_attribute_statement_is_rejected() {
        let start = SUCCESS.find("<AttributeStatement>").unwrap();
        let end = SUCCESS.find("</AttributeStatement>").unwrap() + "</AttributeStatement>".len();
        let mut body = SUCCESS.to_string();
        body.replace_range(start..end, "");

        assert!(matches!(parse(&body), Err(ParseError::Rejected(_))));
    }

    #[test]
    fn empty_attribute_statement_means_no_attributes() {
        let start = SUCCESS.find("<Attribute ").unwrap();
        let end = SUCCESS.rfind("</Attribute>").unwrap() + "</Attribute>".len();
        let mut body = SUCCESS.to_string();
        body.replace_range(start..end, "");

        let p = parse(&body).unwrap();
        assert_eq!(p.user, "chip");
        assert!(p.attributes.is_empty());
    }

    #[test]
    fn invalid_xml_is_malformed() {
        assert!(matches!(parse("<SOAP-ENV:Envelope>"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("no"), Err(ParseError::Malformed(_))));
    }
}
