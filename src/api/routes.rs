/*
 * Responsibility
 * - gRPC service 登録 (envoy.service.auth.v2 / v3 Authorization)
 * - 運用向け HTTP route (health)
 */
use axum::{Router, routing::get};
use envoy_types::ext_authz::v3::pb::AuthorizationServer as AuthorizationV3Server;
use tonic::service::Routes;

use crate::api::handlers::{check::CheckHandler, health::health};
use crate::protocol::v2::server::AuthorizationServer as AuthorizationV2Server;
use crate::protocol::{V2, V3};
use crate::state::AppState;

pub const V2_CHECK_PATH: &str = "/envoy.service.auth.v2.Authorization/Check";
pub const V3_CHECK_PATH: &str = "/envoy.service.auth.v3.Authorization/Check";

// Check messages only carry request metadata (no upstream body by default).
const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Both check services, sharing one `CheckService`.
pub fn grpc_routes(state: AppState) -> Routes {
    let v3 = AuthorizationV3Server::new(CheckHandler::<V3>::new(state.clone()))
        .max_decoding_message_size(MAX_MESSAGE_BYTES);
    let v2 = AuthorizationV2Server::new(CheckHandler::<V2>::new(state))
        .max_decoding_message_size(MAX_MESSAGE_BYTES);

    Routes::new(v3).add_service(v2)
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}
