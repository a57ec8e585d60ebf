pub mod story;
pub mod sync;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use memoir_config::Config;
use memoir_engine::{Reconciler, StoryRepository};
use memoir_remote::{
    BlobClient, Connectivity, DocumentStore, FsBlobClient, FsDocumentStore, IdentityProvider,
    StaticIdentity, connectivity_channel,
};
use memoir_storage::PendingStore;
use time::UtcOffset;

/// Shared dependencies, wired once at startup.
pub struct AppContext {
    pub config: Config,
    pub repository: StoryRepository,
    pub pending: PendingStore,
    pub blobs: Arc<dyn BlobClient>,
    pub zone: UtcOffset,
}

impl AppContext {
    pub async fn init() -> Result<Self> {
        let config = Config::load()?;
        let data_dir = config.data_dir();
        tracing::debug!("data dir: {}", data_dir.display());

        let identity: Arc<dyn IdentityProvider> = match &config.identity {
            Some(name) => Arc::new(StaticIdentity::signed_in(name.clone())),
            None => Arc::new(StaticIdentity::signed_out()),
        };
        let docs: Arc<dyn DocumentStore> =
            Arc::new(FsDocumentStore::open(data_dir.join("stories.json")).await?);
        let blobs: Arc<dyn BlobClient> = Arc::new(FsBlobClient::new(data_dir.join("blobs")));
        let pending = PendingStore::new(Some(data_dir.join("pending.db"))).await?;
        let (_status, connectivity) = connectivity_channel(Connectivity::Available);
        let zone = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

        // Fire-and-forget retry of anything still queued from earlier runs.
        Reconciler::new(pending.clone(), Arc::clone(&blobs)).spawn();

        let repository = StoryRepository::new(
            Arc::clone(&docs),
            Arc::clone(&blobs),
            identity,
            connectivity,
            pending.clone(),
            zone,
        )
        .with_debounce(Duration::from_millis(config.feed.debounce_ms));

        Ok(Self {
            config,
            repository,
            pending,
            blobs,
            zone,
        })
    }
}
