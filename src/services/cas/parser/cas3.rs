//! CAS 2.0 / 3.0 `<cas:serviceResponse>` parser.
use crate::services::cas::error::ParseError;
use crate::services::cas::parser::xml::Element;
use crate::services::cas::principal::Principal;

pub fn parse(body: &str) -> Result<Principal, ParseError> {
    let root = Element::parse(body).map_err(|e| ParseError::malformed(e.to_string()))?;

    if root.name() != "serviceresponse" {
        return Err(ParseError::malformed(format!(
            "expected <serviceResponse>, got <{}>",
            root.name()
        )));
    }

    if let Some(failure) = root.child("authenticationfailure") {
        return Err(ParseError::rejected(
            failure.attr("code").map(str::to_string),
            failure.text(),
        ));
    }

    let success = root
        .child("authenticationsuccess")
        .ok_or_else(|| ParseError::malformed("neither authenticationSuccess nor authenticationFailure"))?;

    let user = success
        .child("user")
        .map(Element::text)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ParseError::malformed("authenticationSuccess without user"))?;

    let mut principal = Principal::new(user);
    for child in success.children() {
        match child.name() {
            "user" => {}
            "attributes" => child
                .children()
                .iter()
                .for_each(|attr| collect(&mut principal, attr)),
            // proxyGrantingTicket, proxies, vendor extensions
            _ => collect(&mut principal, child),
        }
    }

    Ok(principal)
}

// Leaves contribute their text; containers contribute each child's text.
fn collect(principal: &mut Principal, element: &Element) {
    if element.children().is_empty() {
        if !element.text().is_empty() {
            principal.push_attribute(element.name(), element.text());
        }
        return;
    }

    for value in element.children() {
        principal.push_attribute(element.name(), value.text());
    }
}
