//! Identity-scoped story CRUD and live grouped feeds.

use std::sync::Arc;
use std::time::Duration;

use memoir_core::{Error, Result, Story};
use memoir_remote::{
    BlobClient, ConnectivityReceiver, DocumentStore, IdentityProvider, StoryQuery,
};
use memoir_storage::PendingStore;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::mpsc;
use tracing::debug;

use crate::storage_err;
use crate::subscription::{FeedSlot, FeedStream, StoryStream, run_feed, run_selected};

/// Default coalescing window for the full feed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Repository over the remote document store, scoped to the active identity.
/// All capabilities are passed in at construction; the repository owns the
/// single active feed subscription.
pub struct StoryRepository {
    docs: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobClient>,
    identity: Arc<dyn IdentityProvider>,
    connectivity: ConnectivityReceiver,
    pending: PendingStore,
    zone: UtcOffset,
    debounce: Duration,
    feed_slot: FeedSlot,
}

impl StoryRepository {
    pub fn new(
        docs: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobClient>,
        identity: Arc<dyn IdentityProvider>,
        connectivity: ConnectivityReceiver,
        pending: PendingStore,
        zone: UtcOffset,
    ) -> Self {
        Self {
            docs,
            blobs,
            identity,
            connectivity,
            pending,
            zone,
            debounce: DEFAULT_DEBOUNCE,
            feed_slot: FeedSlot::default(),
        }
    }

    /// Override the full-feed coalescing window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    fn active_identity(&self) -> Result<String> {
        self.identity.current_identity().ok_or(Error::Unauthenticated)
    }

    /// Create a story owned by the active identity. Any caller-supplied
    /// owner is overwritten; the document store assigns the id.
    pub async fn create(&self, mut story: Story) -> Result<Story> {
        let owner_id = self.active_identity()?;
        story.owner_id = owner_id;
        self.docs.insert(story).await
    }

    /// Replace a story's fields. `NotFound` when the id is absent.
    pub async fn update(&self, story: Story) -> Result<Story> {
        self.active_identity()?;
        self.docs.update(story).await
    }

    /// Delete one story, returning the snapshot. Its blobs are best-effort
    /// deleted; each immediate failure is queued for reconciliation.
    pub async fn delete(&self, story_id: &str) -> Result<Story> {
        let owner_id = self.active_identity()?;
        let story = self.docs.delete(&owner_id, story_id).await?;
        self.cleanup_blobs(&story.images).await?;
        Ok(story)
    }

    /// Delete every story owned by the active identity in one logical
    /// operation. Requires connectivity; blob cleanup is best-effort with
    /// failures queued.
    pub async fn delete_all(&self) -> Result<bool> {
        let owner_id = self.active_identity()?;
        if !self.connectivity.borrow().is_available() {
            return Err(Error::Transient("no network connection".to_string()));
        }
        let stories = self.docs.delete_owned(&owner_id).await?;
        for story in &stories {
            self.cleanup_blobs(&story.images).await?;
        }
        Ok(true)
    }

    async fn cleanup_blobs(&self, images: &[String]) -> Result<()> {
        for remote_path in images {
            if let Err(err) = self.blobs.delete(remote_path).await {
                debug!("blob delete of {remote_path} deferred: {err}");
                self.pending
                    .enqueue_delete(remote_path)
                    .await
                    .map_err(storage_err)?;
            }
        }
        Ok(())
    }

    /// Live grouped feed of every story owned by the active identity.
    /// Bursts of change notifications coalesce into one emission per
    /// debounce window.
    pub fn observe_all(&self) -> Result<FeedStream> {
        let owner_id = self.active_identity()?;
        Ok(self.spawn_feed(StoryQuery::owned_by(owner_id), Some(self.debounce)))
    }

    /// Live grouped feed restricted to `[window_start, window_end)`.
    pub fn observe_filtered(
        &self,
        window_start: OffsetDateTime,
        window_end: OffsetDateTime,
    ) -> Result<FeedStream> {
        let owner_id = self.active_identity()?;
        let query = StoryQuery::owned_by(owner_id).between(window_start, window_end);
        Ok(self.spawn_feed(query, None))
    }

    fn spawn_feed(&self, query: StoryQuery, debounce: Option<Duration>) -> FeedStream {
        // Cancel whichever mode is active before the new pipeline starts.
        self.feed_slot.clear();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(run_feed(
            Arc::clone(&self.docs),
            query,
            self.zone,
            debounce,
            tx,
        ));
        self.feed_slot.store(handle);
        FeedStream::new(rx)
    }

    /// Live view of one story. Ends with an in-stream `AlreadyDeleted` error
    /// if the story vanishes while observed.
    pub fn observe_selected(&self, story_id: &str) -> Result<StoryStream> {
        let owner_id = self.active_identity()?;
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(run_selected(
            Arc::clone(&self.docs),
            owner_id,
            story_id.to_string(),
            tx,
        ));
        Ok(StoryStream::new(rx))
    }

    /// Cancel whichever feed mode is active (sign-out path).
    pub fn cancel_feed(&self) {
        self.feed_slot.clear();
    }
}
