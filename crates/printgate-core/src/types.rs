// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Printgate print gateway.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{PrintgateError, Result};

/// Maximum number of printers that may share one role.
pub const MAX_PRINTERS_PER_ROLE: usize = 3;

/// Feed length used when a record's `feed` is missing or not a number.
pub const FALLBACK_FEED_LINES: u8 = 3;

/// Character set assumed when a record carries no `encoding`.
pub const DEFAULT_ENCODING: &str = "PC437";

/// Raw TCP port most thermal printers listen on.
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Well-known printer record field names.
pub mod field {
    pub const NAME: &str = "name";
    pub const ROLE: &str = "role";
    pub const IP: &str = "ip";
    pub const PORT: &str = "port";
    pub const WIDTH: &str = "width";
    pub const ENCODING: &str = "encoding";
    pub const CUT: &str = "cut";
    pub const ALIGN: &str = "align";
    pub const FEED: &str = "feed";
    pub const STATUS: &str = "status";
}

/// Whether a printer may receive production print jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    Enabled,
    Disabled,
}

impl PrinterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

// ---------------------------------------------------------------------------
// Role defaults
// ---------------------------------------------------------------------------

/// Physical defaults applied to a printer when it is first added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDefaults {
    /// Printable width in dots.
    pub width: u32,
    /// Whether to cut the paper after each job.
    pub cut: bool,
    /// Text alignment hint.
    pub align: &'static str,
    /// Blank lines fed after content.
    pub feed: u8,
}

/// Narrow 58mm kitchen printers: no cutter, long feed so tickets tear cleanly.
const KITCHEN_DEFAULTS: RoleDefaults = RoleDefaults {
    width: 384,
    cut: false,
    align: "left",
    feed: 6,
};

/// Every role without its own entry gets an 80mm receipt-style printer.
const STANDARD_DEFAULTS: RoleDefaults = RoleDefaults {
    width: 576,
    cut: true,
    align: "center",
    feed: 4,
};

/// Roles with non-standard defaults. Matching is exact and case-sensitive.
const ROLE_DEFAULTS: &[(&str, RoleDefaults)] = &[("KITCHEN", KITCHEN_DEFAULTS)];

impl RoleDefaults {
    /// Look up the defaults for `role`, falling back to the standard set.
    pub fn for_role(role: &str) -> &'static RoleDefaults {
        ROLE_DEFAULTS
            .iter()
            .find(|(name, _)| *name == role)
            .map(|(_, defaults)| defaults)
            .unwrap_or(&STANDARD_DEFAULTS)
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Whether `s` can be used as a printer id or role in the config file.
///
/// The file keys records as `PRINTER_<ID>_<FIELD>`, so ids must not contain
/// the `_` separator, `=`, a leading-comment `#`, or any whitespace.
pub fn is_valid_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_token_char(c) && c != '_')
}

/// Like [`is_valid_token`] but `_` is allowed; field names are re-joined on it.
///
/// Field names are upper-cased on write and lower-cased on read, so only
/// ASCII is accepted: Unicode case mapping does not round-trip (`ß` -> `SS`).
pub fn is_valid_field_name(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && s.chars().all(|c| c.is_ascii() && is_token_char(c))
}

fn is_token_char(c: char) -> bool {
    !(c == '=' || c == '#' || c.is_whitespace() || c.is_control())
}

// ---------------------------------------------------------------------------
// Printer records
// ---------------------------------------------------------------------------

/// One printer endpoint as stored in the registry.
///
/// Records are open-ended string maps: besides the well-known fields in
/// [`field`] an operator may add arbitrary keys, and they are kept as-is.
/// Field order is preserved so the config file stays in the order it was
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterRecord {
    id: String,
    fields: Vec<(String, String)>,
}

impl PrinterRecord {
    /// A record carrying only its id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// A freshly added printer: `{role}{index}` with every default populated.
    pub fn with_defaults(role: &str, index: usize) -> Self {
        let defaults = RoleDefaults::for_role(role);
        let mut record = Self::new(format!("{role}{index}"));
        record.set(field::NAME, format!("{role} Printer {index}"));
        record.set(field::ROLE, role);
        record.set(field::IP, "0.0.0.0");
        record.set(field::PORT, DEFAULT_PRINTER_PORT.to_string());
        record.set(field::WIDTH, defaults.width.to_string());
        record.set(field::ENCODING, DEFAULT_ENCODING);
        record.set(field::CUT, defaults.cut.to_string());
        record.set(field::ALIGN, defaults.align);
        record.set(field::FEED, defaults.feed.to_string());
        record.set(field::STATUS, PrinterStatus::Disabled.as_str());
        record
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Value of `name`, if the record has that field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a field, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// All fields except `id`, in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn role(&self) -> Option<&str> {
        self.get(field::ROLE)
    }

    pub fn status(&self) -> Option<&str> {
        self.get(field::STATUS)
    }

    /// Production jobs are only accepted when `status` is exactly `enabled`.
    pub fn is_enabled(&self) -> bool {
        self.status() == Some(PrinterStatus::Enabled.as_str())
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.get(field::NAME).unwrap_or(&self.id)
    }

    /// Character set name, unmodified, or [`DEFAULT_ENCODING`] when unset.
    pub fn encoding(&self) -> &str {
        match self.get(field::ENCODING) {
            Some(enc) if !enc.is_empty() => enc,
            _ => DEFAULT_ENCODING,
        }
    }

    /// Lines to feed after content.
    ///
    /// `feed` is free text in the file; anything that is not an integer
    /// yields [`FALLBACK_FEED_LINES`], and out-of-range values are clamped
    /// to what a single ESC/POS feed command can express.
    pub fn feed_lines(&self) -> u8 {
        match self.get(field::FEED).map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<i64>() {
                Ok(n) => n.clamp(0, u8::MAX as i64) as u8,
                Err(_) => FALLBACK_FEED_LINES,
            },
            _ => FALLBACK_FEED_LINES,
        }
    }

    /// Whether to emit a paper cut; only the literal `"true"` counts.
    pub fn cuts_paper(&self) -> bool {
        self.get(field::CUT) == Some("true")
    }

    /// Build a record from a loosely-typed JSON object (admin UI payloads).
    ///
    /// `id` must be a non-empty string. Strings are kept verbatim, numbers and
    /// booleans are stringified, `null` drops the field, and nested values are
    /// stored as their JSON text.
    pub fn from_json(object: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let id = match object.get("id") {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(PrintgateError::InvalidInput("id required".into())),
        };

        let mut record = Self::new(id);
        for (key, value) in object {
            if key == "id" {
                continue;
            }
            let text = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s,
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            record.set(key, text);
        }
        Ok(record)
    }
}

impl Serialize for PrinterRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Clients and server identity
// ---------------------------------------------------------------------------

/// Credentials issued to a client allowed to submit print jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub pin: String,
}

/// Identity of this gateway instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub server_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitchen_printer_defaults() {
        let record = PrinterRecord::with_defaults("KITCHEN", 1);
        assert_eq!(record.id(), "KITCHEN1");
        assert_eq!(record.get(field::NAME), Some("KITCHEN Printer 1"));
        assert_eq!(record.get(field::WIDTH), Some("384"));
        assert_eq!(record.get(field::CUT), Some("false"));
        assert_eq!(record.get(field::ALIGN), Some("left"));
        assert_eq!(record.get(field::FEED), Some("6"));
        assert_eq!(record.get(field::ENCODING), Some("PC437"));
        assert_eq!(record.get(field::PORT), Some("9100"));
        assert_eq!(record.status(), Some("disabled"));
    }

    #[test]
    fn other_roles_get_standard_defaults() {
        let record = PrinterRecord::with_defaults("BAR", 2);
        assert_eq!(record.id(), "BAR2");
        assert_eq!(record.get(field::WIDTH), Some("576"));
        assert_eq!(record.get(field::CUT), Some("true"));
        assert_eq!(record.get(field::ALIGN), Some("center"));
        assert_eq!(record.get(field::FEED), Some("4"));
    }

    #[test]
    fn role_defaults_are_case_sensitive() {
        assert_eq!(RoleDefaults::for_role("kitchen").width, 576);
        assert_eq!(RoleDefaults::for_role("KITCHEN").width, 384);
    }

    #[test]
    fn feed_lines_falls_back_for_non_numeric() {
        let mut record = PrinterRecord::new("R1");
        assert_eq!(record.feed_lines(), FALLBACK_FEED_LINES);
        record.set(field::FEED, "x");
        assert_eq!(record.feed_lines(), 3);
        record.set(field::FEED, " 7 ");
        assert_eq!(record.feed_lines(), 7);
        record.set(field::FEED, "-2");
        assert_eq!(record.feed_lines(), 0);
        record.set(field::FEED, "1000");
        assert_eq!(record.feed_lines(), 255);
    }

    #[test]
    fn only_literal_true_cuts() {
        let mut record = PrinterRecord::new("R1");
        assert!(!record.cuts_paper());
        record.set(field::CUT, "TRUE");
        assert!(!record.cuts_paper());
        record.set(field::CUT, "true");
        assert!(record.cuts_paper());
    }

    #[test]
    fn set_replaces_in_place() {
        let mut record = PrinterRecord::new("R1");
        record.set("role", "BAR");
        record.set("ip", "1.2.3.4");
        record.set("role", "KITCHEN");
        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, vec![("role", "KITCHEN"), ("ip", "1.2.3.4")]);
    }

    #[test]
    fn tokens_reject_separators() {
        assert!(is_valid_token("KITCHEN"));
        assert!(is_valid_token("BAR-2"));
        assert!(!is_valid_token(""));
        assert!(!is_valid_token("FRONT_BAR"));
        assert!(!is_valid_token("A=B"));
        assert!(!is_valid_token("A B"));
        assert!(is_valid_field_name("paper_width"));
        assert!(!is_valid_field_name("_width"));
        assert!(!is_valid_field_name("straße"));
        assert!(!is_valid_field_name("İcon"));
    }

    #[test]
    fn from_json_stringifies_scalars() {
        let value = serde_json::json!({
            "id": "BAR1",
            "port": 9100,
            "cut": true,
            "name": "Bar",
            "note": null,
        });
        let serde_json::Value::Object(map) = value else {
            unreachable!()
        };
        let record = PrinterRecord::from_json(map).expect("valid record");
        assert_eq!(record.id(), "BAR1");
        assert_eq!(record.get("port"), Some("9100"));
        assert_eq!(record.get("cut"), Some("true"));
        assert_eq!(record.get("note"), None);
    }

    #[test]
    fn from_json_requires_id() {
        let serde_json::Value::Object(map) = serde_json::json!({ "role": "BAR" }) else {
            unreachable!()
        };
        assert!(matches!(
            PrinterRecord::from_json(map),
            Err(PrintgateError::InvalidInput(_))
        ));
    }

    #[test]
    fn serializes_id_first() {
        let mut record = PrinterRecord::new("R1");
        record.set("role", "BAR");
        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"id":"R1","role":"BAR"}"#);
    }
}
