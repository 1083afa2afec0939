// # Import Handle
//
// Long-lived import worker plus the handle used to queue runs on it.
// Requests are processed one at a time, so two runs never write to the
// store concurrently.

use crate::config::ImportSettings;
use crate::db::Database;
use crate::import::service::Importer;
use crate::import::types::{ImportError, ImportProgress, ImportReport};
use crate::sheets::SheetSource;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Queued import waiting for the worker
struct ImportRequest {
    settings: ImportSettings,
    progress_tx: Option<mpsc::UnboundedSender<ImportProgress>>,
    reply_tx: oneshot::Sender<Result<ImportReport, ImportError>>,
}

/// Handle for queueing import runs and awaiting their results
#[derive(Clone)]
pub struct ImportHandle {
    requests_tx: mpsc::UnboundedSender<ImportRequest>,
}

impl ImportHandle {
    /// Queue an import and wait until it finishes or fails.
    ///
    /// Progress events for this run go to `progress_tx` when given.
    pub async fn run_import(
        &self,
        settings: ImportSettings,
        progress_tx: Option<mpsc::UnboundedSender<ImportProgress>>,
    ) -> Result<ImportReport, ImportError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests_tx
            .send(ImportRequest {
                settings,
                progress_tx,
                reply_tx,
            })
            .map_err(|_| ImportError::ServiceStopped)?;

        reply_rx.await.map_err(|_| ImportError::ServiceStopped)?
    }
}

/// Import worker that owns the store and the sheet source
pub struct ImportService {
    database: Database,
    source: Arc<dyn SheetSource>,
    requests_rx: mpsc::UnboundedReceiver<ImportRequest>,
}

impl ImportService {
    /// Start import service worker, returning handle for sending requests
    pub fn start(
        runtime_handle: tokio::runtime::Handle,
        database: Database,
        source: Arc<dyn SheetSource>,
    ) -> ImportHandle {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();

        let service = ImportService {
            database,
            source,
            requests_rx,
        };
        runtime_handle.spawn(service.listen_for_import_requests());

        ImportHandle { requests_tx }
    }

    async fn listen_for_import_requests(mut self) {
        info!("Import worker started");

        while let Some(request) = self.requests_rx.recv().await {
            let result = self
                .handle_import_request(request.settings, request.progress_tx)
                .await;
            if request.reply_tx.send(result).is_err() {
                warn!("Import caller went away before the run finished");
            }
        }

        info!("Import request channel closed, worker exiting");
    }

    async fn handle_import_request(
        &self,
        settings: ImportSettings,
        progress_tx: Option<mpsc::UnboundedSender<ImportProgress>>,
    ) -> Result<ImportReport, ImportError> {
        settings.validate()?;

        // Dropped without commit on failure, which rolls the run back
        let mut batch = self.database.begin_import_batch().await?;

        let mut importer = Importer::new(self.source.as_ref(), settings);
        if let Some(progress_tx) = progress_tx {
            importer = importer.with_progress(progress_tx);
        }
        importer.run(&mut batch).await
    }
}
