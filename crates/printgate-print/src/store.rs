// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Whole-document persistence for the printer registry.
//
// The registry has no partial-update semantics: every mutation rewrites the
// entire document.  `FileStore` writes to a sibling temp file and renames it
// over the target, so a concurrent reader sees either the old document or the
// new one, never a half-written file.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, instrument, warn};

use printgate_core::error::{PrintgateError, Result};

/// Read-whole / write-whole access to the registry document.
pub trait RegistryStore: Send + Sync {
    /// The current document, or `None` if nothing has been written yet.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the document.
    fn write(&self, document: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Registry document on local disk (`printer.env`).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "registry".into());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

impl RegistryStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn read(&self) -> Result<Option<String>> {
        match fs::read(&self.path) {
            // Hand edits in a non-UTF-8 editor must not make the registry unreadable.
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("registry file does not exist yet");
                Ok(None)
            }
            Err(e) => Err(PrintgateError::Persistence(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    #[instrument(skip(self, document), fields(path = %self.path.display(), bytes = document.len()))]
    fn write(&self, document: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                PrintgateError::Persistence(format!("create {}: {e}", parent.display()))
            })?;
        }

        let temp = self.temp_path();
        let written = File::create(&temp)
            .and_then(|mut file| {
                file.write_all(document.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp, &self.path));

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(error = %cleanup, "could not remove temp registry file");
                }
            }
            return Err(PrintgateError::Persistence(format!(
                "write {}: {e}",
                self.path.display()
            )));
        }

        debug!("registry document written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Registry document held in memory (useful for tests).
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `document`.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
            writes: AtomicUsize::new(0),
        }
    }

    /// The last document written, if any.
    pub fn document(&self) -> Option<String> {
        self.document.lock().ok().and_then(|doc| doc.clone())
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl RegistryStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        self.document
            .lock()
            .map(|doc| doc.clone())
            .map_err(|_| PrintgateError::Persistence("memory store lock poisoned".into()))
    }

    fn write(&self, document: &str) -> Result<()> {
        let mut doc = self
            .document
            .lock()
            .map_err(|_| PrintgateError::Persistence("memory store lock poisoned".into()))?;
        *doc = Some(document.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
