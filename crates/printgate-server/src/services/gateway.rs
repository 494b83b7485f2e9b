// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer shared by every HTTP handler.
//
// The registry and the client store do blocking I/O, so their calls are
// moved onto tokio's blocking pool.  The rusqlite connection is `Send` but not
// `Sync`, so the client store sits behind `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::{ClientCredentials, PrinterRecord};
use printgate_core::GatewayConfig;
use printgate_print::{Dispatcher, FileStore, PrinterRegistry, RawTcpTransport, Registry};

use super::clients::ClientStore;

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone)]
pub struct GatewayServices {
    registry: Arc<PrinterRegistry>,
    dispatcher: Dispatcher,
    clients: Arc<Mutex<ClientStore>>,
    server_id: Arc<str>,
}

impl GatewayServices {
    pub fn new(
        registry: PrinterRegistry,
        dispatcher: Dispatcher,
        clients: ClientStore,
        server_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            dispatcher,
            clients: Arc::new(Mutex::new(clients)),
            server_id: server_id.into(),
        }
    }

    /// Wire up the on-disk registry, the raw TCP transport and the client
    /// database described by `config`.
    pub fn init(config: &GatewayConfig, server_id: String) -> Result<Self> {
        info!(
            registry = %config.registry_path.display(),
            clients = %config.client_db_path.display(),
            "initialising gateway services"
        );

        let registry = PrinterRegistry::new(Arc::new(FileStore::new(&config.registry_path)));
        let dispatcher = Dispatcher::new(Arc::new(RawTcpTransport::new(
            config.dispatch_timeout(),
        )));
        let clients = ClientStore::open(&config.client_db_path)?;

        Ok(Self::new(registry, dispatcher, clients, server_id))
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    // -- Printers ------------------------------------------------------------

    pub async fn list_printers(&self) -> Result<Registry> {
        let registry = Arc::clone(&self.registry);
        blocking(move || registry.list()).await
    }

    pub async fn add_printer(&self, role: String) -> Result<PrinterRecord> {
        let registry = Arc::clone(&self.registry);
        blocking(move || registry.add_printer(&role)).await
    }

    pub async fn save_printer(&self, record: PrinterRecord) -> Result<()> {
        let registry = Arc::clone(&self.registry);
        blocking(move || registry.save_printer(record)).await
    }

    async fn find_printer(&self, id: String) -> Result<PrinterRecord> {
        let registry = Arc::clone(&self.registry);
        blocking(move || {
            registry
                .lookup(&id)?
                .ok_or(PrintgateError::PrinterNotFound(id))
        })
        .await
    }

    /// Diagnostic print; works on disabled printers.
    pub async fn test_printer(&self, id: String) -> Result<()> {
        let record = self.find_printer(id).await?;
        self.dispatcher.test_print(&record).await
    }

    /// Production print; the printer must be enabled.
    pub async fn print_text(&self, printer_id: String, text: &str) -> Result<()> {
        let record = self.find_printer(printer_id).await?;
        self.dispatcher.dispatch(&record, text).await
    }

    // -- Clients -------------------------------------------------------------

    pub async fn register_client(&self) -> Result<ClientCredentials> {
        let clients = Arc::clone(&self.clients);
        blocking(move || lock(&clients)?.register()).await
    }

    pub async fn list_clients(&self) -> Result<Vec<ClientCredentials>> {
        let clients = Arc::clone(&self.clients);
        blocking(move || lock(&clients)?.list()).await
    }

    pub async fn verify_client(&self, client_id: String, pin: String) -> Result<bool> {
        let clients = Arc::clone(&self.clients);
        blocking(move || lock(&clients)?.verify(&client_id, &pin)).await
    }

    /// Close the client database if this is the last handle to it.
    pub fn shutdown(self) {
        let Ok(clients) = Arc::try_unwrap(self.clients) else {
            warn!("client store still in use at shutdown; leaving it to drop");
            return;
        };
        let closed = clients
            .into_inner()
            .map_err(|_| PrintgateError::Database("client store lock poisoned".into()))
            .and_then(ClientStore::close);
        match closed {
            Ok(()) => info!("client database closed"),
            Err(e) => warn!(error = %e, "client database did not close cleanly"),
        }
    }
}

fn lock(clients: &Mutex<ClientStore>) -> Result<MutexGuard<'_, ClientStore>> {
    clients
        .lock()
        .map_err(|_| PrintgateError::Database("client store lock poisoned".into()))
}

/// Run blocking store work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PrintgateError::Persistence(format!("blocking task failed: {e}")))?
}
