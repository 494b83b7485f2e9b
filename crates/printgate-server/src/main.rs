// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printgate: local print-dispatch gateway.
//
// Entry point. Loads `.env`, initialises logging and backend services, and
// serves the HTTP API until Ctrl-C.

mod routes;
mod services;

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use printgate_core::GatewayConfig;
use printgate_core::error::Result;

use services::gateway::GatewayServices;
use services::server_id::ensure_server_id;

const ENV_FILE: &str = ".env";

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal; settings then come from the process environment.
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(GatewayConfig::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "printgate stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: GatewayConfig) -> Result<()> {
    let server_id = ensure_server_id(config.server_id.clone(), Path::new(ENV_FILE));
    let services = GatewayServices::init(&config, server_id)?;
    let app = routes::router(services.clone(), &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        server_id = services.server_id(),
        port = config.port,
        "printgate server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    services.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
