//! Wire protocol adapters (Envoy `ext_authz` check messages, v2 and v3).
//!
//! Each version owns its protobuf message types; a handler generic over
//! [`WireProtocol`] decodes `P::CheckRequest` and can only emit
//! `P::CheckResponse`, so the two families never mix.
//!
//! Nothing outside this module knows which version a request arrived on.

use axum::http::StatusCode;
use envoy_types::pb::google::rpc;

use crate::services::authz::{Decision, Headers, Request};

pub mod v2;
pub mod v3;

pub trait WireProtocol: Send + Sync + 'static {
    /// Short label for logs (`"v2"`, `"v3"`).
    const VERSION: &'static str;

    type CheckRequest: prost::Message + Default + Send + 'static;
    type CheckResponse: prost::Message + Send + 'static;

    fn into_request(message: Self::CheckRequest) -> Request;

    fn from_decision(decision: &Decision) -> Self::CheckResponse;
}

/// `envoy.service.auth.v2`
#[derive(Debug, Clone, Copy)]
pub enum V2 {}

/// `envoy.service.auth.v3`
#[derive(Debug, Clone, Copy)]
pub enum V3 {}

// google.rpc.Code values used in CheckResponse.status
const RPC_OK: i32 = 0;
const RPC_PERMISSION_DENIED: i32 = 7;
const RPC_INTERNAL: i32 = 13;
const RPC_UNAUTHENTICATED: i32 = 16;

/// `google.rpc.Status` for a decision, shared by both versions.
pub(crate) fn rpc_status(decision: &Decision) -> rpc::Status {
    if decision.is_allowed() {
        return rpc::Status {
            code: RPC_OK,
            ..Default::default()
        };
    }

    let status = decision.status();
    let code = match status {
        StatusCode::UNAUTHORIZED => RPC_UNAUTHENTICATED,
        StatusCode::INTERNAL_SERVER_ERROR => RPC_INTERNAL,
        _ => RPC_PERMISSION_DENIED,
    };

    rpc::Status {
        code,
        message: status.canonical_reason().unwrap_or_default().to_string(),
        ..Default::default()
    }
}

/// Flatten injected headers into `(name, value, append)`.
///
/// The first value of a name replaces whatever the caller sent; the rest are
/// appended so multi-valued headers survive.
pub(crate) fn header_mutations(headers: &Headers) -> impl Iterator<Item = (&str, &str, bool)> {
    headers.iter().flat_map(|(name, values)| {
        values
            .iter()
            .enumerate()
            .map(move |(i, value)| (name, value.as_str(), i > 0))
    })
}

/// Envoy puts the query string inside `path` and usually leaves `query` empty.
pub(crate) fn split_target(path: String, query: String) -> (String, String) {
    if !query.is_empty() {
        return (path, query);
    }
    match path.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (path, query),
    }
}
