// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client credential store backed by SQLite.
//
// Each client that may submit print jobs is issued an id and a numeric PIN.
// Both are stored in plain text; the PIN is a pairing code for devices on the
// local network, not a password.

use std::path::Path;

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rusqlite::{Connection, params};
use tracing::{info, instrument};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::ClientCredentials;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id TEXT NOT NULL,
        pin TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
"#;

const CLIENT_ID_PREFIX: &str = "clt-";
const CLIENT_ID_SUFFIX_LEN: usize = 6;

/// Registered clients.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively.  In an async context, wrap calls in `tokio::task::spawn_blocking`.
pub struct ClientStore {
    conn: Connection,
}

impl ClientStore {
    /// Open (or create) the client database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| PrintgateError::Database(format!("open: {e}")))?;
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| PrintgateError::Database(format!("create table: {e}")))?;

        info!("client database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PrintgateError::Database(format!("open in-memory: {e}")))?;
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| PrintgateError::Database(format!("create table: {e}")))?;

        tracing::debug!("in-memory client database opened");
        Ok(Self { conn })
    }

    /// Issue and store a fresh client id and PIN.
    pub fn register(&self) -> Result<ClientCredentials> {
        let mut rng = rand::thread_rng();
        let suffix: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(CLIENT_ID_SUFFIX_LEN)
            .map(char::from)
            .collect();
        let credentials = ClientCredentials {
            client_id: format!("{CLIENT_ID_PREFIX}{suffix}"),
            pin: rng.gen_range(100_000..1_000_000u32).to_string(),
        };

        self.conn
            .execute(
                "INSERT INTO clients (client_id, pin, created_at) VALUES (?1, ?2, ?3)",
                params![
                    credentials.client_id,
                    credentials.pin,
                    Utc::now().timestamp_millis()
                ],
            )
            .map_err(|e| PrintgateError::Database(format!("insert client: {e}")))?;

        info!(client_id = %credentials.client_id, "client registered");
        Ok(credentials)
    }

    /// Whether `client_id` and `pin` belong to the same registered client.
    #[instrument(skip(self, pin))]
    pub fn verify(&self, client_id: &str, pin: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM clients WHERE client_id = ?1 AND pin = ?2)",
                params![client_id, pin],
                |row| row.get(0),
            )
            .map_err(|e| PrintgateError::Database(format!("verify client: {e}")))
    }

    /// Every registered client, oldest first.
    pub fn list(&self) -> Result<Vec<ClientCredentials>> {
        let mut stmt = self
            .conn
            .prepare("SELECT client_id, pin FROM clients ORDER BY id")
            .map_err(|e| PrintgateError::Database(format!("prepare: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ClientCredentials {
                    client_id: row.get(0)?,
                    pin: row.get(1)?,
                })
            })
            .map_err(|e| PrintgateError::Database(format!("list clients: {e}")))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PrintgateError::Database(format!("read client row: {e}")))
    }

    /// Close the connection, reporting any error SQLite raises.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| PrintgateError::Database(format!("close: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_issues_well_formed_credentials() {
        let store = ClientStore::open_in_memory().expect("open");
        let creds = store.register().expect("register");

        assert!(creds.client_id.starts_with("clt-"));
        assert_eq!(creds.client_id.len(), 4 + CLIENT_ID_SUFFIX_LEN);
        assert!(creds.client_id[4..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(creds.pin.len(), 6);
        assert!(creds.pin.chars().all(|c| c.is_ascii_digit()));
        assert!(!creds.pin.starts_with('0'));
    }

    #[test]
    fn verify_requires_matching_pair() {
        let store = ClientStore::open_in_memory().expect("open");
        let a = store.register().expect("a");
        let b = store.register().expect("b");

        assert!(store.verify(&a.client_id, &a.pin).expect("verify"));
        assert!(!store.verify(&a.client_id, "000000").expect("verify"));
        assert!(!store.verify("clt-nobody", &a.pin).expect("verify"));
        if a.pin != b.pin {
            assert!(!store.verify(&a.client_id, &b.pin).expect("verify"));
        }
    }

    #[test]
    fn verify_is_not_injectable() {
        let store = ClientStore::open_in_memory().expect("open");
        store.register().expect("register");
        assert!(!store.verify("' OR '1'='1", "' OR '1'='1").expect("verify"));
    }

    #[test]
    fn list_returns_clients_in_registration_order() {
        let store = ClientStore::open_in_memory().expect("open");
        let first = store.register().expect("first");
        let second = store.register().expect("second");
        assert_eq!(store.list().expect("list"), vec![first, second]);
    }

    #[test]
    fn clients_persist_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("print_server.db");

        let store = ClientStore::open(&path).expect("open");
        let creds = store.register().expect("register");
        store.close().expect("close");

        let reopened = ClientStore::open(&path).expect("reopen");
        assert!(reopened.verify(&creds.client_id, &creds.pin).expect("verify"));
    }
}
