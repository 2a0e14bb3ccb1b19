/*
 * Responsibility
 * - 起動 / transport 層のエラー (設定・TLS・bind・gRPC server)
 * - 判定エラー (CheckError) は services::authz 側で完結し、ここには来ない
 */
use thiserror::Error;

use crate::config::ConfigError;
use crate::tls::TlsError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid TLS configuration: {0}")]
    Tls(#[from] TlsError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("gRPC server error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("health server error: {0}")]
    Serve(#[from] std::io::Error),
}
