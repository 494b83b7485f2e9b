// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gateway identity and client pairing.

use axum::Json;
use axum::extract::State;
use tracing::info;

use printgate_core::types::{ClientCredentials, ServerInfo};

use super::ApiError;
use crate::services::gateway::GatewayServices;

/// `GET /server-info`
pub async fn server_info(State(services): State<GatewayServices>) -> Json<ServerInfo> {
    Json(ServerInfo {
        server_id: services.server_id().to_string(),
    })
}

/// `POST /api/register-client`
///
/// The PIN is logged so the operator can read it off the gateway console
/// when pairing a device.
pub async fn register_client(
    State(services): State<GatewayServices>,
) -> Result<Json<ClientCredentials>, ApiError> {
    let credentials = services.register_client().await?;
    info!(
        client_id = %credentials.client_id,
        pin = %credentials.pin,
        "new client registered"
    );
    Ok(Json(credentials))
}

/// `GET /api/clients`, as `[[client_id, pin], ...]`.
pub async fn list_clients(
    State(services): State<GatewayServices>,
) -> Result<Json<Vec<(String, String)>>, ApiError> {
    let pairs = services
        .list_clients()
        .await?
        .into_iter()
        .map(|c| (c.client_id, c.pin))
        .collect();
    Ok(Json(pairs))
}
