//! Capability trait definitions.

use async_trait::async_trait;
use memoir_core::{Result, Story};
use time::OffsetDateTime;
use tokio::sync::{broadcast, watch};

/// Incremental change notification from the document store.
#[derive(Debug, Clone)]
pub enum DocEvent {
    Created { owner_id: String, story_id: String },
    Updated { owner_id: String, story_id: String },
    Deleted { owner_id: String, story_id: String },
}

impl DocEvent {
    pub fn owner_id(&self) -> &str {
        match self {
            DocEvent::Created { owner_id, .. }
            | DocEvent::Updated { owner_id, .. }
            | DocEvent::Deleted { owner_id, .. } => owner_id,
        }
    }

    pub fn story_id(&self) -> &str {
        match self {
            DocEvent::Created { story_id, .. }
            | DocEvent::Updated { story_id, .. }
            | DocEvent::Deleted { story_id, .. } => story_id,
        }
    }
}

/// Identity-scoped story query, optionally restricted to a half-open
/// `[start, end)` time window.
#[derive(Debug, Clone, Default)]
pub struct StoryQuery {
    pub owner_id: String,
    pub window: Option<(OffsetDateTime, OffsetDateTime)>,
}

impl StoryQuery {
    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            window: None,
        }
    }

    pub fn between(mut self, start: OffsetDateTime, end: OffsetDateTime) -> Self {
        self.window = Some((start, end));
        self
    }
}

/// Remote document store holding stories. Writes are transactional per
/// document; concurrent writes to the same id resolve last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Insert a new story, assigning its id. The owner must already be set.
    async fn insert(&self, story: Story) -> Result<Story>;

    /// Replace an existing story's fields, keeping id and owner. Fails with
    /// `NotFound` when the id is absent.
    async fn update(&self, story: Story) -> Result<Story>;

    /// Fetch one story within the owner scope.
    async fn get(&self, owner_id: &str, story_id: &str) -> Result<Option<Story>>;

    /// Delete one story within the owner scope, returning the snapshot.
    /// A story matching on id but owned elsewhere reports `NotFound`.
    async fn delete(&self, owner_id: &str, story_id: &str) -> Result<Story>;

    /// Delete every story owned by `owner_id` in one logical operation,
    /// returning the deleted snapshots.
    async fn delete_owned(&self, owner_id: &str) -> Result<Vec<Story>>;

    /// Run an identity-scoped query.
    async fn query(&self, query: &StoryQuery) -> Result<Vec<Story>>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<DocEvent>;
}

/// Outcome of a blob put attempt.
#[derive(Debug, Clone)]
pub enum PutOutcome {
    /// The object is confirmed present remotely.
    Complete,
    /// The transfer started but did not finish; `session_token` resumes it.
    InProgress { session_token: String },
}

/// Remote blob store. Operations are idempotent: deleting an absent object
/// succeeds, re-putting an existing object succeeds.
#[async_trait]
pub trait BlobClient: Send + Sync + 'static {
    /// Upload `source_uri` to `remote_path`, resuming from `session_token`
    /// when one is given.
    async fn put(
        &self,
        remote_path: &str,
        source_uri: &str,
        session_token: Option<&str>,
    ) -> Result<PutOutcome>;

    /// Delete `remote_path`.
    async fn delete(&self, remote_path: &str) -> Result<()>;
}

/// Resolved identity of the signed-in user, if any.
pub trait IdentityProvider: Send + Sync + 'static {
    fn current_identity(&self) -> Option<String>;

    fn logged_in(&self) -> bool {
        self.current_identity().is_some()
    }
}

/// Network status as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Available,
    Unavailable,
    Losing,
    Lost,
}

impl Connectivity {
    /// The engine only acts on the available/unavailable distinction.
    pub fn is_available(self) -> bool {
        matches!(self, Connectivity::Available)
    }
}

pub type ConnectivityReceiver = watch::Receiver<Connectivity>;

/// Connectivity source; keep the sender to drive status changes, or drop it
/// for a fixed status.
pub fn connectivity_channel(
    initial: Connectivity,
) -> (watch::Sender<Connectivity>, ConnectivityReceiver) {
    watch::channel(initial)
}
