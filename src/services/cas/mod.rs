//! CAS (Central Authentication Service) client protocol engine.
//!
//! Public API:
//! - CasConfig / Version
//! - CasClient (authenticate, validate)
//! - Transport / Verify collaborators
//! - Authentication / Outcome / Responder
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod parser;
pub mod principal;
pub mod service_url;
pub mod transport;
pub mod validation;
pub mod verify;
pub mod version;

pub use config::CasConfig;
pub use context::RequestContext;
pub use engine::{
    AuthenticateOptions, Authentication, CasClient, Failure, Outcome, RedirectInstruction,
    Responder,
};
pub use error::{CasError, ConfigError, ParseError, Rejection};
pub use principal::Principal;
pub use transport::{HttpTransport, Transport, TransportError};
pub use validation::{HttpMethod, ValidationRequest};
pub use verify::{BoxError, Done, Verdict, Verify, verify_fn};
pub use version::{ParserKind, Version};
