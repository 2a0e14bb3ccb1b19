/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config 読み込み → 依存生成 (CheckService, error reporter) → gRPC routes 組み立て
 * - gRPC (mTLS または開発用の平文) と health (HTTP) を同じ shutdown signal で起動
 */
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use std::{panic, process, sync::Arc};

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Server, ServerTlsConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::services::authz::build_check_service;
use crate::services::authz::report::BufferedReporter;
use crate::state::AppState;
use crate::{api, middleware, tls};

// Bounds a single check call, the decision itself never waits.
const GRPC_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,ext_authz=debug,error_report=info cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, keep serving other requests.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting authorization server in {:?} mode on {} (tls: {}, health: {:?})",
        config.app_env,
        config.addr,
        config.tls.is_some(),
        config.health_addr
    );

    let tls = config
        .tls
        .as_ref()
        .map(tls::server_tls_config)
        .transpose()?;
    if tls.is_none() {
        tracing::warn!("TLS disabled, serving plaintext gRPC");
    }

    let state = build_state(&config);
    let listener = bind(config.addr).await?;
    let health_listener = match config.health_addr {
        Some(addr) => Some(bind(addr).await?),
        None => None,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });

    let grpc_shutdown = wait_for(shutdown_rx.clone());
    let health_shutdown = wait_for(shutdown_rx);

    let grpc = async move {
        serve_grpc(listener, state, tls, grpc_shutdown).await?;
        Ok::<_, AppError>(())
    };
    let health = async move {
        if let Some(listener) = health_listener {
            axum::serve(listener, build_health_router())
                .with_graceful_shutdown(health_shutdown)
                .await?;
        }
        Ok::<_, AppError>(())
    };

    tokio::try_join!(grpc, health)?;
    tracing::info!("authorization server stopped");
    Ok(())
}

fn build_state(config: &Config) -> AppState {
    // Error reports are drained on a background task so the check path never waits on them.
    let reporter = Arc::new(BufferedReporter::spawn(config.error_report_buffer));
    AppState::new(build_check_service(config, reporter))
}

async fn bind(addr: SocketAddr) -> Result<TcpListener, AppError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })
}

/// Serve both check services on `listener` until `shutdown` resolves.
///
/// In-flight calls are drained before returning.
pub async fn serve_grpc(
    listener: TcpListener,
    state: AppState,
    tls: Option<ServerTlsConfig>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), tonic::transport::Error> {
    let mut server = Server::builder()
        .timeout(GRPC_REQUEST_TIMEOUT)
        .trace_fn(|req| tracing::info_span!("grpc", path = %req.uri().path()));
    if let Some(tls) = tls {
        server = server.tls_config(tls)?;
    }

    server
        .add_routes(api::grpc_routes(state))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}

/// Health router with HTTP middleware applied.
pub fn build_health_router() -> Router {
    middleware::http::apply(api::health_routes())
}

fn wait_for(mut rx: watch::Receiver<()>) -> impl Future<Output = ()> {
    async move {
        let _ = rx.changed().await;
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
