//! Response parsers, one per protocol family.
pub mod cas1;
pub mod cas3;
pub mod saml;
pub mod xml;

use crate::services::cas::error::ParseError;
use crate::services::cas::principal::Principal;
use crate::services::cas::version::ParserKind;

pub fn parse(kind: ParserKind, body: &str) -> Result<Principal, ParseError> {
    match kind {
        ParserKind::PlainText => cas1::parse(body),
        ParserKind::ServiceResponse => cas3::parse(body),
        ParserKind::Saml => saml::parse(body),
    }
}
