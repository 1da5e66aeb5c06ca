// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sovereign_tee_server::api::router;
use sovereign_tee_server::config::Config;
use sovereign_tee_server::identity::IdentityStore;
use sovereign_tee_server::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // Resolve the signing identity before anything serves: no request may
    // observe a partially-resolved identity.
    let identity = match IdentityStore::new(&config).resolve() {
        Ok(identity) => identity,
        Err(e) => {
            error!(error_code = e.error_code(), error = %e, "identity resolution failed");
            return ExitCode::FAILURE;
        }
    };
    info!(address = %identity.address(), "enclave signing identity ready");

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let app = router(AppState::new(identity, config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!("sovereign TEE server listening on http://{addr} (docs at /docs)");

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = served {
        error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Initialize the tracing subscriber: `LOG_FORMAT=json` for structured logs,
/// pretty output otherwise; level filter from `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolve on ctrl-c or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
