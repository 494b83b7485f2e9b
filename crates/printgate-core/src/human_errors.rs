// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages and response classification.
//
// Every error is mapped to a short plain-English message, a suggestion the
// person at the admin screen can act on, and a class that the HTTP layer
// turns into a status code.

use std::io::ErrorKind as IoKind;

use crate::error::PrintgateError;

/// How a failed request should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself is malformed or violates a registry rule.
    BadInput,
    /// Credentials were not supplied.
    Unauthorized,
    /// Credentials were supplied but are not valid.
    Forbidden,
    /// The addressed printer does not exist.
    NotFound,
    /// The printer exists but is not accepting production jobs.
    Unavailable,
    /// The printer could not be reached or did not accept the data.
    DeviceFailure,
    /// Something on the gateway itself failed (storage, database).
    ServerFailure,
}

/// A human-readable error with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Drives the response status.
    pub class: ErrorClass,
}

/// Convert a `PrintgateError` into a `HumanError`.
pub fn humanize_error(err: &PrintgateError) -> HumanError {
    match err {
        PrintgateError::InvalidInput(detail) => HumanError {
            message: "The request is missing something or has an invalid value.".into(),
            suggestion: format!("Check the request and try again. ({detail})"),
            class: ErrorClass::BadInput,
        },

        PrintgateError::InvalidPrinterConfig { id, reason } => HumanError {
            message: format!("Printer {id} has an invalid configuration."),
            suggestion: format!("Open the printer settings and fix the address. ({reason})"),
            class: ErrorClass::BadInput,
        },

        PrintgateError::UnsupportedEncoding(name) => HumanError {
            message: format!("The character set \"{name}\" is not supported."),
            suggestion: "Pick a supported encoding such as PC437 or WPC1252 in the printer settings."
                .into(),
            class: ErrorClass::BadInput,
        },

        PrintgateError::CapacityExceeded { role, limit } => HumanError {
            message: format!("Limit reached: {role} already has {limit} printers."),
            suggestion: "Reuse one of the existing printers for this role, or add the printer under a different role.".into(),
            class: ErrorClass::BadInput,
        },

        PrintgateError::PrinterNotFound(id) => HumanError {
            message: format!("Printer {id} was not found."),
            suggestion: "Reload the printer list; the id may have been mistyped.".into(),
            class: ErrorClass::NotFound,
        },

        PrintgateError::PrinterUnavailable(id) => HumanError {
            message: format!("Printer {id} is not enabled."),
            suggestion: "Run a test print, then set the printer's status to enabled.".into(),
            class: ErrorClass::Unavailable,
        },

        PrintgateError::InvalidCredentials => HumanError {
            message: "The client id or PIN is not valid.".into(),
            suggestion: "Register the client again to get a fresh PIN.".into(),
            class: ErrorClass::Forbidden,
        },

        PrintgateError::Transport { addr, source } => humanize_transport(addr, source.kind()),

        PrintgateError::Timeout { addr, .. } => HumanError {
            message: format!("The printer at {addr} didn't respond in time."),
            suggestion: "The printer might be busy or turned off. Check it's on and on the same network, then try again.".into(),
            class: ErrorClass::DeviceFailure,
        },

        PrintgateError::Persistence(_) | PrintgateError::Io(_) => HumanError {
            message: "The printer configuration file could not be read or written.".into(),
            suggestion: "Check the gateway has write access to its data directory and that the disk is not full.".into(),
            class: ErrorClass::ServerFailure,
        },

        PrintgateError::Database(_) => HumanError {
            message: "The client database had a problem.".into(),
            suggestion: "Try again. If this keeps happening, restart the gateway.".into(),
            class: ErrorClass::ServerFailure,
        },
    }
}

fn humanize_transport(addr: &str, kind: IoKind) -> HumanError {
    let (message, suggestion) = match kind {
        IoKind::ConnectionRefused => (
            format!("The printer at {addr} refused our connection."),
            "The printer may be turned off or the port may be wrong. Port 9100 is usual.",
        ),
        IoKind::ConnectionReset | IoKind::ConnectionAborted | IoKind::BrokenPipe => (
            format!("The connection to the printer at {addr} was interrupted."),
            "Check the network cable or Wi-Fi, then try again.",
        ),
        IoKind::TimedOut => (
            format!("The printer at {addr} didn't respond in time."),
            "The printer might be busy or turned off. Check it's on, then try again.",
        ),
        _ => (
            format!("We couldn't talk to the printer at {addr}."),
            "Check the printer's IP address and that it is on the same network as the gateway.",
        ),
    };

    HumanError {
        message,
        suggestion: suggestion.into(),
        class: ErrorClass::DeviceFailure,
    }
}
