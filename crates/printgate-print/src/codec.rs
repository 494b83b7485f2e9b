// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec for the flat `printer.env` registry format.
//
// The file is meant to be edited by hand, so it is a plain list of
// `PRINTER_<ID>_<FIELD>=<VALUE>` lines grouped under a comment header per
// printer:
//
//   # ---- KITCHEN1 ----
//   PRINTER_KITCHEN1_NAME=KITCHEN Printer 1
//   PRINTER_KITCHEN1_ROLE=KITCHEN
//   PRINTER_KITCHEN1_IP=192.168.1.50
//
// Decoding is lenient: anything it does not recognise is skipped, and it
// never fails.  Encoding always rewrites the whole document.

use std::collections::BTreeMap;

use tracing::trace;

use printgate_core::types::PrinterRecord;

/// All printer records keyed by id, iterated in ascending id order.
pub type Registry = BTreeMap<String, PrinterRecord>;

/// Every recognised key starts with this.
const KEY_PREFIX: &str = "PRINTER_";

/// Separates the id from the field name inside a key.
const KEY_SEPARATOR: char = '_';

/// Lines starting with this are comments.
const COMMENT_MARKER: char = '#';

/// Parse a registry document.
pub fn decode(text: &str) -> Registry {
    let mut registry = Registry::new();

    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }

        // Only the first `=` splits; values may contain more of them.
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some(rest) = key.strip_prefix(KEY_PREFIX) else {
            continue;
        };
        let Some((id, field)) = rest.split_once(KEY_SEPARATOR) else {
            continue;
        };

        let field = field.to_lowercase();
        // `id` comes from the key itself and cannot be overridden by a field.
        if id.is_empty() || field.is_empty() || field == "id" {
            trace!(line, "skipping unusable registry line");
            continue;
        }

        registry
            .entry(id.to_string())
            .or_insert_with(|| PrinterRecord::new(id))
            .set(field, value);
    }

    registry
}

/// Serialize a registry document.
pub fn encode(registry: &Registry) -> String {
    let mut lines = Vec::new();

    for record in registry.values() {
        let id = record.id();
        lines.push(format!("{COMMENT_MARKER} ---- {id} ----"));
        for (field, value) in record.fields() {
            lines.push(format!(
                "{KEY_PREFIX}{id}{KEY_SEPARATOR}{}={value}",
                field.to_uppercase()
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
