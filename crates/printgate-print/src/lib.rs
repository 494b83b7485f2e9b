// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printgate print: the printer registry and dispatch engine.  This crate
// owns the `printer.env` codec and store, the role-capacity rules applied when
// printers are added, and the ESC/POS command stream sent to each device over
// raw TCP.

pub mod codec;
pub mod codepage;
pub mod dispatch;
pub mod escpos;
pub mod registry;
pub mod store;
pub mod transport;

pub use codec::Registry;
pub use dispatch::Dispatcher;
pub use registry::PrinterRegistry;
pub use store::{FileStore, MemoryStore, RegistryStore};
pub use transport::{PrinterTransport, RawTcpTransport, RecordingTransport};
