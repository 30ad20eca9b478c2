/*
 * Responsibility
 * - v1 handler 向け extractor の公開
 */
mod cas_request;

pub use cas_request::CasRequest;
