// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend service layer. Registry, dispatch and client credentials sit behind a
// single cloneable handle for the HTTP handlers.

pub mod clients;
pub mod gateway;
pub mod server_id;
