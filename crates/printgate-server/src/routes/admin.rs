// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer administration endpoints used by the admin UI.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use printgate_core::error::PrintgateError;
use printgate_core::types::PrinterRecord;
use printgate_print::Registry;

use super::{ApiError, required};
use crate::services::gateway::GatewayServices;

#[derive(Debug, Deserialize)]
pub struct AddPrinterRequest {
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestPrinterRequest {
    #[serde(default)]
    id: Option<String>,
}

/// `GET /admin/printers`
pub async fn list_printers(
    State(services): State<GatewayServices>,
) -> Result<Json<Registry>, ApiError> {
    Ok(Json(services.list_printers().await?))
}

/// `POST /admin/printers/add`
pub async fn add_printer(
    State(services): State<GatewayServices>,
    body: Result<Json<AddPrinterRequest>, JsonRejection>,
) -> Result<Json<PrinterRecord>, ApiError> {
    let Json(request) = body?;
    let role = required(request.role)
        .ok_or_else(|| PrintgateError::InvalidInput("role required".into()))?;
    Ok(Json(services.add_printer(role).await?))
}

/// `POST /admin/printers/save`
pub async fn save_printer(
    State(services): State<GatewayServices>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(object) = body?;
    let record = PrinterRecord::from_json(object)?;
    services.save_printer(record).await?;
    Ok(Json(json!({ "ok": true })))
}

/// `POST /admin/printers/test`
pub async fn test_printer(
    State(services): State<GatewayServices>,
    body: Result<Json<TestPrinterRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let id = required(request.id).ok_or_else(|| PrintgateError::InvalidInput("id required".into()))?;
    services.test_printer(id).await?;
    Ok(Json(json!({ "ok": true })))
}
