// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer registry operations over a `RegistryStore`.
//
// Nothing is cached: every operation decodes the stored document, and every
// mutation encodes and writes the whole registry back.  Mutations hold a
// registry-wide lock across that read-modify-write cycle so two concurrent
// `add_printer` calls cannot both pass the role-capacity check, and two saves
// cannot lose each other's update.
//
// All methods are synchronous (file I/O).  In an async context, wrap calls in
// `tokio::task::spawn_blocking`.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, instrument};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::{
    MAX_PRINTERS_PER_ROLE, PrinterRecord, is_valid_field_name, is_valid_token,
};

use crate::codec::{self, Registry};
use crate::store::RegistryStore;

/// The printer registry, backed by durable storage.
pub struct PrinterRegistry {
    store: Arc<dyn RegistryStore>,
    write_lock: Mutex<()>,
}

impl PrinterRegistry {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// A fresh snapshot of every printer.
    pub fn list(&self) -> Result<Registry> {
        Ok(self
            .store
            .read()?
            .map(|doc| codec::decode(&doc))
            .unwrap_or_default())
    }

    /// Look up one printer. `Ok(None)` means no record has that id.
    pub fn lookup(&self, id: &str) -> Result<Option<PrinterRecord>> {
        Ok(self.list()?.remove(id))
    }

    /// Create a printer for `role` with every default populated.
    ///
    /// Fails with `CapacityExceeded`, leaving the store untouched, when the
    /// role already has [`MAX_PRINTERS_PER_ROLE`] printers.
    #[instrument(skip(self))]
    pub fn add_printer(&self, role: &str) -> Result<PrinterRecord> {
        if role.trim().is_empty() {
            return Err(PrintgateError::InvalidInput("role required".into()));
        }
        if !is_valid_token(role) {
            return Err(PrintgateError::InvalidInput(format!(
                "role {role:?} may not contain '_', '=', '#' or whitespace"
            )));
        }

        let _guard = self.lock()?;
        let mut registry = self.list()?;

        let count = registry
            .values()
            .filter(|record| record.role() == Some(role))
            .count();
        if count >= MAX_PRINTERS_PER_ROLE {
            debug!(count, "role is at capacity");
            return Err(PrintgateError::CapacityExceeded {
                role: role.to_string(),
                limit: MAX_PRINTERS_PER_ROLE,
            });
        }

        // Ids are never reused; skip past one taken by a hand-edited record.
        let mut index = count + 1;
        while registry.contains_key(&format!("{role}{index}")) {
            index += 1;
        }

        let record = PrinterRecord::with_defaults(role, index);
        registry.insert(record.id().to_string(), record.clone());
        self.persist(&registry)?;

        info!(id = record.id(), "printer added");
        Ok(record)
    }

    /// Replace whatever record occupies `record.id()` with `record`.
    ///
    /// No capacity or consistency checks happen here; only what the file
    /// format cannot represent is rejected.  Field names are stored lower-case.
    #[instrument(skip(self, record), fields(id = record.id()))]
    pub fn save_printer(&self, record: PrinterRecord) -> Result<()> {
        let record = normalize(record)?;

        let _guard = self.lock()?;
        let mut registry = self.list()?;
        registry.insert(record.id().to_string(), record);
        self.persist(&registry)?;

        info!("printer saved");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| PrintgateError::Persistence("registry lock poisoned".into()))
    }

    fn persist(&self, registry: &Registry) -> Result<()> {
        self.store.write(&codec::encode(registry))
    }
}

/// Check that `record` survives the codec, lower-casing its field names.
fn normalize(record: PrinterRecord) -> Result<PrinterRecord> {
    let id = record.id();
    if !is_valid_token(id) {
        return Err(PrintgateError::InvalidInput(format!(
            "printer id {id:?} may not contain '_', '=', '#' or whitespace"
        )));
    }

    let mut normalized = PrinterRecord::new(id);
    for (name, value) in record.fields() {
        let name = name.to_lowercase();
        if name == "id" || !is_valid_field_name(&name) {
            return Err(PrintgateError::InvalidInput(format!(
                "invalid field name {name:?}"
            )));
        }
        if value.contains(['\n', '\r']) {
            return Err(PrintgateError::InvalidInput(format!(
                "field {name} may not contain line breaks"
            )));
        }
        normalized.set(name, value);
    }
    // The file has no line for a record without fields.
    if normalized.fields().next().is_none() {
        return Err(PrintgateError::InvalidInput(format!(
            "printer {id} has no fields to save"
        )));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use printgate_core::types::field;

    use super::*;
    use crate::store::{FileStore, MemoryStore};

    fn memory_registry() -> (Arc<MemoryStore>, PrinterRegistry) {
        let store = Arc::new(MemoryStore::new());
        let registry = PrinterRegistry::new(store.clone());
        (store, registry)
    }

    #[test]
    fn first_kitchen_printer_gets_kitchen_defaults() {
        let (_, registry) = memory_registry();
        let record = registry.add_printer("KITCHEN").expect("add");

        assert_eq!(record.id(), "KITCHEN1");
        assert_eq!(record.get(field::WIDTH), Some("384"));
        assert_eq!(record.get(field::CUT), Some("false"));
        assert_eq!(record.get(field::FEED), Some("6"));
        assert_eq!(record.status(), Some("disabled"));
        assert_eq!(registry.lookup("KITCHEN1").expect("lookup"), Some(record));
    }

    #[test]
    fn fourth_printer_for_a_role_is_rejected() {
        let (store, registry) = memory_registry();
        let ids: Vec<String> = (0..3)
            .map(|_| registry.add_printer("BAR").expect("add").id().to_string())
            .collect();
        assert_eq!(ids, ["BAR1", "BAR2", "BAR3"]);

        let before = store.document();
        let writes = store.write_count();
        let err = registry.add_printer("BAR").expect_err("fourth add");
        assert!(matches!(
            err,
            PrintgateError::CapacityExceeded { ref role, limit: 3 } if role == "BAR"
        ));
        assert_eq!(store.document(), before);
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn capacity_is_per_role() {
        let (_, registry) = memory_registry();
        for _ in 0..3 {
            registry.add_printer("BAR").expect("bar");
        }
        let receipt = registry.add_printer("RECEIPT").expect("receipt");
        assert_eq!(receipt.id(), "RECEIPT1");
    }

    #[test]
    fn missing_or_unsafe_role_is_input_error() {
        let (store, registry) = memory_registry();
        for role in ["", "  ", "FRONT_BAR", "A=B"] {
            assert!(matches!(
                registry.add_printer(role),
                Err(PrintgateError::InvalidInput(_))
            ));
        }
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn hand_edited_id_is_not_reused() {
        let store = Arc::new(MemoryStore::with_document(
            "PRINTER_BAR1_ROLE=RECEIPT\nPRINTER_BAR1_NAME=Moved\n",
        ));
        let registry = PrinterRegistry::new(store);
        let record = registry.add_printer("BAR").expect("add");
        assert_eq!(record.id(), "BAR2");
        assert_eq!(
            registry
                .lookup("BAR1")
                .expect("lookup")
                .expect("kept")
                .role(),
            Some("RECEIPT")
        );
    }

    #[test]
    fn save_replaces_the_whole_record() {
        let (_, registry) = memory_registry();
        registry.add_printer("BAR").expect("add");

        let mut replacement = PrinterRecord::new("BAR1");
        replacement.set("role", "BAR");
        replacement.set("ip", "10.0.0.7");
        registry.save_printer(replacement.clone()).expect("save");

        let stored = registry.lookup("BAR1").expect("lookup").expect("found");
        assert_eq!(stored, replacement);
        assert_eq!(stored.get(field::WIDTH), None);
    }

    #[test]
    fn save_is_idempotent() {
        let (store, registry) = memory_registry();
        registry.add_printer("KITCHEN").expect("add");

        let mut record = registry.lookup("KITCHEN1").expect("lookup").expect("found");
        record.set(field::STATUS, "enabled");
        record.set(field::FEED, "x");

        registry.save_printer(record.clone()).expect("save once");
        let once = store.document();
        registry.save_printer(record).expect("save twice");
        assert_eq!(store.document(), once);
    }

    #[test]
    fn save_skips_capacity_check() {
        let (_, registry) = memory_registry();
        for _ in 0..3 {
            registry.add_printer("BAR").expect("add");
        }
        let mut extra = PrinterRecord::new("BAR9");
        extra.set("role", "BAR");
        registry.save_printer(extra).expect("save");
        assert_eq!(registry.list().expect("list").len(), 4);
    }

    #[test]
    fn save_lowercases_field_names() {
        let (_, registry) = memory_registry();
        let mut record = PrinterRecord::new("R1");
        record.set("IP", "1.2.3.4");
        registry.save_printer(record).expect("save");
        let stored = registry.lookup("R1").expect("lookup").expect("found");
        assert_eq!(stored.get("ip"), Some("1.2.3.4"));
    }

    #[test]
    fn save_rejects_what_the_file_cannot_hold() {
        let (store, registry) = memory_registry();

        let mut multiline = PrinterRecord::new("R1");
        multiline.set("name", "two\nlines");
        assert!(registry.save_printer(multiline).is_err());

        assert!(registry.save_printer(PrinterRecord::new("R_1")).is_err());

        let mut bad_field = PrinterRecord::new("R1");
        bad_field.set("paper width", "80");
        assert!(registry.save_printer(bad_field).is_err());

        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn save_rejects_record_without_fields() {
        let (store, registry) = memory_registry();
        let err = registry
            .save_printer(PrinterRecord::new("R1"))
            .expect_err("nothing to store");
        assert!(matches!(err, PrintgateError::InvalidInput(_)));
        assert_eq!(store.write_count(), 0);
        assert!(registry.lookup("R1").expect("lookup").is_none());
    }

    #[test]
    fn save_rejects_field_names_that_change_case_badly() {
        let (store, registry) = memory_registry();
        for name in ["straße", "İcon"] {
            let mut record = PrinterRecord::new("R1");
            record.set(name, "x");
            assert!(matches!(
                registry.save_printer(record),
                Err(PrintgateError::InvalidInput(_))
            ));
        }
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn saved_field_names_come_back_unchanged() {
        let (_, registry) = memory_registry();
        let mut record = PrinterRecord::new("R1");
        record.set("paper_width", "80");
        record.set("ip", "1.2.3.4");
        registry.save_printer(record.clone()).expect("save");
        assert_eq!(registry.lookup("R1").expect("lookup"), Some(record));
    }

    #[test]
    fn registry_round_trips_through_the_store() {
        let (_, registry) = memory_registry();
        registry.add_printer("KITCHEN").expect("add");
        registry.add_printer("BAR").expect("add");
        let mut sparse = PrinterRecord::new("R1");
        sparse.set("role", "BAR");
        sparse.set("ip", "1.2.3.4");
        registry.save_printer(sparse).expect("save");

        let snapshot = registry.list().expect("list");
        let reparsed = codec::decode(&codec::encode(&snapshot));
        assert_eq!(reparsed, snapshot);
    }

    #[test]
    fn lookup_unknown_is_none() {
        let (_, registry) = memory_registry();
        assert!(registry.lookup("NOPE1").expect("lookup").is_none());
    }

    #[test]
    fn concurrent_adds_never_exceed_capacity() {
        let (_, registry) = memory_registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.add_printer("BAR").is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, MAX_PRINTERS_PER_ROLE);
        assert_eq!(registry.list().expect("list").len(), MAX_PRINTERS_PER_ROLE);
    }

    #[test]
    fn file_backed_registry_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("printer.env");

        let first = PrinterRegistry::new(Arc::new(FileStore::new(&path)));
        first.add_printer("KITCHEN").expect("add");

        let reopened = PrinterRegistry::new(Arc::new(FileStore::new(&path)));
        let record = reopened.lookup("KITCHEN1").expect("lookup").expect("found");
        assert_eq!(record.get(field::NAME), Some("KITCHEN Printer 1"));
    }
}
