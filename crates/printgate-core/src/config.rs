// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Process-wide gateway settings, read from the environment at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listen port (`PORT`, default 3000).
    pub port: u16,
    /// Printer registry file (`PRINTER_ENV`, default `printer.env`).
    pub registry_path: PathBuf,
    /// SQLite database holding client credentials (`CLIENT_DB`).
    pub client_db_path: PathBuf,
    /// Directory served as the admin UI (`STATIC_DIR`, default `public`).
    pub static_dir: PathBuf,
    /// Connect and write timeout for printer connections, in seconds
    /// (`DISPATCH_TIMEOUT_SECS`, default 5).
    pub dispatch_timeout_secs: u64,
    /// Stable identity of this gateway (`SERVER_ID`). `None` until generated.
    pub server_id: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            registry_path: PathBuf::from("printer.env"),
            client_db_path: PathBuf::from("print_server.db"),
            static_dir: PathBuf::from("public"),
            dispatch_timeout_secs: 5,
            server_id: None,
        }
    }
}

impl GatewayConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or unparsable keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, "PORT") {
            config.port = port;
        }
        if let Some(path) = non_empty(&lookup, "PRINTER_ENV") {
            config.registry_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty(&lookup, "CLIENT_DB") {
            config.client_db_path = PathBuf::from(path);
        }
        if let Some(dir) = non_empty(&lookup, "STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_var(&lookup, "DISPATCH_TIMEOUT_SECS") {
            config.dispatch_timeout_secs = secs;
        }
        config.server_id = non_empty(&lookup, "SERVER_ID");

        config
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs.max(1))
    }
}

/// A new random gateway identity, `srv-<uuid>`.
pub fn generate_server_id() -> String {
    format!("srv-{}", Uuid::new_v4())
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = non_empty(lookup, key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = GatewayConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.registry_path, PathBuf::from("printer.env"));
        assert_eq!(config.dispatch_timeout(), Duration::from_secs(5));
        assert!(config.server_id.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("PRINTER_ENV", "/etc/printgate/printers.env"),
            ("DISPATCH_TIMEOUT_SECS", "2"),
            ("SERVER_ID", "srv-fixed"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.registry_path,
            PathBuf::from("/etc/printgate/printers.env")
        );
        assert_eq!(config.dispatch_timeout(), Duration::from_secs(2));
        assert_eq!(config.server_id.as_deref(), Some("srv-fixed"));
    }

    #[test]
    fn bad_port_keeps_default() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn zero_timeout_is_raised_to_one_second() {
        let config = GatewayConfig::from_lookup(lookup_from(&[("DISPATCH_TIMEOUT_SECS", "0")]));
        assert_eq!(config.dispatch_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn generated_server_ids_are_prefixed_and_unique() {
        let a = generate_server_id();
        let b = generate_server_id();
        assert!(a.starts_with("srv-"));
        assert_ne!(a, b);
    }
}
