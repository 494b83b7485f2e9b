// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dispatch engine: turns a printer record plus payload text into an ESC/POS
// stream and delivers it.
//
// Production jobs go through `dispatch`, which refuses printers whose status
// is not `enabled`.  Diagnostic jobs go through `test_print`, which skips that
// gate so a newly added printer can be checked before it is enabled.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::{PrinterRecord, field};

use crate::codepage::CodePage;
use crate::escpos::EscPosBuilder;
use crate::transport::PrinterTransport;

/// First line of every diagnostic print.
pub const TEST_PRINT_TITLE: &str = "PRINTGATE TEST";

/// Sends jobs to printers over a shared transport.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn PrinterTransport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn PrinterTransport>) -> Self {
        Self { transport }
    }

    /// Print `payload` on an enabled printer.
    ///
    /// A disabled printer fails with `PrinterUnavailable` before any
    /// connection is opened.
    #[instrument(skip(self, record, payload), fields(id = record.id()))]
    pub async fn dispatch(&self, record: &PrinterRecord, payload: &str) -> Result<()> {
        if !record.is_enabled() {
            warn!(status = record.status(), "refusing job for printer that is not enabled");
            return Err(PrintgateError::PrinterUnavailable(record.id().to_string()));
        }
        self.deliver(record, payload).await
    }

    /// Print the fixed diagnostic page regardless of status.
    #[instrument(skip(self, record), fields(id = record.id()))]
    pub async fn test_print(&self, record: &PrinterRecord) -> Result<()> {
        let payload = format!("{TEST_PRINT_TITLE}\n{}", record.display_name());
        self.deliver(record, &payload).await
    }

    async fn deliver(&self, record: &PrinterRecord, payload: &str) -> Result<()> {
        let addr = printer_address(record)?;
        let stream = build_command_stream(record, payload)?;
        self.transport.send(&addr, &stream).await?;
        info!(addr = %addr, bytes = stream.len(), "job sent");
        Ok(())
    }
}

/// `ip:port` for a record, validated.  IPv6 literals are bracketed.
pub fn printer_address(record: &PrinterRecord) -> Result<String> {
    let invalid = |reason: String| PrintgateError::InvalidPrinterConfig {
        id: record.id().to_string(),
        reason,
    };

    let ip = record
        .get(field::IP)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .ok_or_else(|| invalid("ip is not set".into()))?;
    let port = record
        .get(field::PORT)
        .map(str::trim)
        .filter(|port| !port.is_empty())
        .ok_or_else(|| invalid("port is not set".into()))?;
    let port: u16 = match port.parse() {
        Ok(0) | Err(_) => return Err(invalid(format!("port {port:?} is not a valid TCP port"))),
        Ok(port) => port,
    };

    if ip.contains(':') && !ip.starts_with('[') {
        Ok(format!("[{ip}]:{port}"))
    } else {
        Ok(format!("{ip}:{port}"))
    }
}

/// The full ESC/POS stream for one job on `record`.
pub fn build_command_stream(record: &PrinterRecord, payload: &str) -> Result<Vec<u8>> {
    let code_page = CodePage::from_name(record.encoding())?;

    let mut builder = EscPosBuilder::new(code_page);
    builder.line(payload).feed(record.feed_lines());
    if record.cuts_paper() {
        builder.cut();
    }
    Ok(builder.build())
}
