//! Client side of the CAS single-sign-on handshake, plus a small axum host
//! that exercises it.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
