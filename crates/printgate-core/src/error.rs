// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Printgate.

use std::time::Duration;

use thiserror::Error;

/// Top-level error type for all Printgate operations.
#[derive(Debug, Error)]
pub enum PrintgateError {
    // -- Input errors --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("printer {id} is misconfigured: {reason}")]
    InvalidPrinterConfig { id: String, reason: String },

    #[error("unsupported printer encoding: {0}")]
    UnsupportedEncoding(String),

    // -- Registry errors --
    #[error("role {role} already has the maximum of {limit} printers")]
    CapacityExceeded { role: String, limit: usize },

    #[error("printer not found: {0}")]
    PrinterNotFound(String),

    #[error("printer unavailable: {0}")]
    PrinterUnavailable(String),

    // -- Client credentials --
    #[error("unknown client credentials")]
    InvalidCredentials,

    // -- Device transport --
    #[error("printer at {addr}: {source}")]
    Transport {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("printer at {addr} did not respond within {after:?}")]
    Timeout { addr: String, after: Duration },

    // -- Storage / persistence --
    #[error("registry store error: {0}")]
    Persistence(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`PrintgateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid caller-supplied field.
    Input,
    /// The role already holds its maximum number of printers.
    CapacityExceeded,
    /// Unknown printer id or unknown client credentials.
    NotFound,
    /// Printer is known but not enabled for production jobs.
    Unavailable,
    /// Connect, write, or timeout failure talking to a device.
    Transport,
    /// Durable store unreadable or unwritable.
    Persistence,
}

impl PrintgateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_)
            | Self::InvalidPrinterConfig { .. }
            | Self::UnsupportedEncoding(_) => ErrorKind::Input,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::PrinterNotFound(_) | Self::InvalidCredentials => ErrorKind::NotFound,
            Self::PrinterUnavailable(_) => ErrorKind::Unavailable,
            Self::Transport { .. } | Self::Timeout { .. } => ErrorKind::Transport,
            Self::Persistence(_) | Self::Database(_) | Self::Io(_) => ErrorKind::Persistence,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintgateError>;
