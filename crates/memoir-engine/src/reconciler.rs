//! Retry of queued blob operations until each is confirmed.

use std::sync::Arc;

use memoir_remote::{BlobClient, ConnectivityReceiver, PutOutcome};
use memoir_storage::PendingStore;
use tokio::task::JoinHandle;
use tracing::debug;

/// Drains the pending-operation store against the blob client. A row is
/// removed only on confirmed success; anything else stays queued for the
/// next pass. Failures are never surfaced beyond a debug log.
pub struct Reconciler {
    pending: PendingStore,
    blobs: Arc<dyn BlobClient>,
}

impl Reconciler {
    pub fn new(pending: PendingStore, blobs: Arc<dyn BlobClient>) -> Self {
        Self { pending, blobs }
    }

    /// Run a single pass over every queued upload and delete.
    pub async fn run_once(&self) {
        if let Err(err) = self.drain().await {
            debug!("reconciliation pass did not complete: {err}");
        }
    }

    async fn drain(&self) -> memoir_storage::Result<()> {
        for upload in self.pending.list_uploads().await? {
            let outcome = self
                .blobs
                .put(
                    &upload.remote_path,
                    &upload.source_uri,
                    upload.session_token.as_deref(),
                )
                .await;
            match outcome {
                Ok(PutOutcome::Complete) => self.pending.remove_upload(upload.id).await?,
                Ok(PutOutcome::InProgress { session_token }) => {
                    // Still unconfirmed; resume from the newest checkpoint
                    // next time.
                    self.pending
                        .update_upload_session(upload.id, &session_token)
                        .await?;
                }
                Err(err) => debug!("retry of upload {} failed: {err}", upload.remote_path),
            }
        }

        for delete in self.pending.list_deletes().await? {
            match self.blobs.delete(&delete.remote_path).await {
                Ok(()) => self.pending.remove_delete(delete.id).await?,
                Err(err) => debug!("retry of delete {} failed: {err}", delete.remote_path),
            }
        }

        Ok(())
    }

    /// Fire-and-forget pass at process start. Never awaited by callers and
    /// never reports to the user.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_once().await })
    }

    /// Run a pass now and another whenever connectivity returns.
    pub fn spawn_on_reconnect(self, mut connectivity: ConnectivityReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_once().await;
            while connectivity.changed().await.is_ok() {
                let available = connectivity.borrow_and_update().is_available();
                if available {
                    self.run_once().await;
                }
            }
        })
    }
}
