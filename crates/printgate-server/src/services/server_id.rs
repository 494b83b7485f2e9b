// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stable gateway identity.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use printgate_core::config::generate_server_id;

/// The configured server id, or a newly generated one.
///
/// A generated id is appended to `env_file` so the next start picks it up.
/// Failing to write the file is logged and otherwise ignored; the id is still
/// used for this process.
pub fn ensure_server_id(configured: Option<String>, env_file: &Path) -> String {
    if let Some(id) = configured {
        return id;
    }

    let id = generate_server_id();
    let appended = OpenOptions::new()
        .create(true)
        .append(true)
        .open(env_file)
        .and_then(|mut file| writeln!(file, "\nSERVER_ID={id}"));

    match appended {
        Ok(()) => info!(server_id = %id, file = %env_file.display(), "generated server id"),
        Err(e) => warn!(
            error = %e,
            file = %env_file.display(),
            "generated server id could not be saved; it will change on restart"
        ),
    }
    id
}
