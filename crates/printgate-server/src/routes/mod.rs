// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP surface: admin API, client pairing, print submission, and the static
// admin UI as a fallback.

pub mod admin;
pub mod clients;
pub mod print;

use std::path::Path;

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use printgate_core::error::{ErrorKind, PrintgateError};
use printgate_core::human_errors::{ErrorClass, humanize_error};

use crate::services::gateway::GatewayServices;

/// Build the application router.
pub fn router(services: GatewayServices, static_dir: &Path) -> Router {
    Router::new()
        .route("/server-info", get(clients::server_info))
        .route("/api/register-client", post(clients::register_client))
        .route("/api/clients", get(clients::list_clients))
        .route("/admin/printers", get(admin::list_printers))
        .route("/admin/printers/add", post(admin::add_printer))
        .route("/admin/printers/save", post(admin::save_printer))
        .route("/admin/printers/test", post(admin::test_printer))
        .route("/print/text", post(print::print_text))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}

/// Response status for an error class.
pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::BadInput => StatusCode::BAD_REQUEST,
        ErrorClass::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorClass::Forbidden => StatusCode::FORBIDDEN,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorClass::DeviceFailure => StatusCode::BAD_GATEWAY,
        ErrorClass::ServerFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A failed request, rendered as `{ "error", "message", "hint" }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: Option<ErrorKind>,
    body: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl ApiError {
    pub fn missing_credentials() -> Self {
        Self {
            status: status_for(ErrorClass::Unauthorized),
            kind: None,
            body: ErrorBody {
                error: "client_id and pin required".into(),
                message: None,
                hint: Some("Register this device to get a client id and PIN.".into()),
            },
        }
    }
}

impl From<PrintgateError> for ApiError {
    fn from(err: PrintgateError) -> Self {
        let human = humanize_error(&err);
        Self {
            status: status_for(human.class),
            kind: Some(err.kind()),
            body: ErrorBody {
                error: err.to_string(),
                message: Some(human.message),
                hint: Some(human.suggestion),
            },
        }
    }
}

/// A body that is not a JSON object of the expected shape is bad input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        PrintgateError::InvalidInput(format!("request body: {}", rejection.body_text())).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = %self.status,
                kind = ?self.kind,
                error = %self.body.error,
                "request failed"
            );
        } else {
            warn!(
                status = %self.status,
                kind = ?self.kind,
                error = %self.body.error,
                "request rejected"
            );
        }
        (self.status, Json(self.body)).into_response()
    }
}

/// `Some` only for a present, non-blank value.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
