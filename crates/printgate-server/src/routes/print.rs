// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print submission from paired clients.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::{Value, json};

use printgate_core::error::PrintgateError;

use super::{ApiError, required};
use crate::services::gateway::GatewayServices;

#[derive(Debug, Deserialize)]
pub struct PrintTextRequest {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    pin: Option<String>,
    #[serde(default)]
    printer_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// `POST /print/text`
///
/// Missing credentials are 401, wrong ones 403; only then is the printer
/// looked up and the status gate applied.
pub async fn print_text(
    State(services): State<GatewayServices>,
    body: Result<Json<PrintTextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let (Some(client_id), Some(pin)) = (required(request.client_id), required(request.pin)) else {
        return Err(ApiError::missing_credentials());
    };
    if !services.verify_client(client_id, pin).await? {
        return Err(PrintgateError::InvalidCredentials.into());
    }

    let printer_id = required(request.printer_id)
        .ok_or_else(|| PrintgateError::InvalidInput("printer_id required".into()))?;
    let text = request.text.unwrap_or_default();
    services.print_text(printer_id, &text).await?;

    Ok(Json(json!({ "ok": true })))
}
