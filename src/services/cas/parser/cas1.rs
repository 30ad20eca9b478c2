//! CAS 1.0 plain-text response: `yes\n<user>\n` or `no\n\n`.
use crate::services::cas::error::ParseError;
use crate::services::cas::principal::Principal;

pub fn parse(body: &str) -> Result<Principal, ParseError> {
    let mut lines = body.split('\n').map(|line| line.trim_end_matches('\r'));

    match (lines.next(), lines.next()) {
        (Some("no"), _) => Err(ParseError::rejected(None, "authentication rejected")),
        (Some("yes"), Some(user)) if !user.trim().is_empty() => Ok(Principal::new(user.trim())),
        _ => Err(ParseError::malformed("expected `yes\\n<user>` or `no`")),
    }
}
