/*
 * Responsibility
 * - check service (gRPC v2/v3) と health (HTTP) の公開ポイント
 */
pub mod handlers;
mod routes;

pub use routes::{V2_CHECK_PATH, V3_CHECK_PATH, grpc_routes, health_routes};
