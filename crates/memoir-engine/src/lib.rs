//! Story synchronization engine
//!
//! This crate contains:
//! - StoryRepository: identity-scoped CRUD and live grouped feeds
//! - Reconciler: retry of queued blob operations until confirmed
//! - GallerySession: staged image additions/removals for one edit

pub mod gallery;
pub mod reconciler;
pub mod repository;
pub mod subscription;

pub use gallery::{GalleryImage, GallerySession};
pub use reconciler::Reconciler;
pub use repository::{DEFAULT_DEBOUNCE, StoryRepository};
pub use subscription::{FeedItem, FeedStream, StoryItem, StoryStream};

pub(crate) fn storage_err(err: memoir_storage::StorageError) -> memoir_core::Error {
    memoir_core::Error::Other(err.into())
}
