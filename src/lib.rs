//! External authorization service for Envoy `ext_authz`.
//!
//! Decides ALLOW / DENY for each proxied request and, for a valid bearer
//! token, returns identity headers (`Request-User-*`, `Request-Id`) for the
//! upstream to trust.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod services;
pub mod state;
pub mod tls;
