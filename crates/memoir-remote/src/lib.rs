//! Remote capability seams for memoir
//!
//! This crate provides:
//! - Capability traits: document store, blob client, identity, connectivity
//! - In-memory backend (tests and throwaway sessions)
//! - Filesystem backend (local-first usage: JSON documents, blob directory)

pub mod fs;
pub mod memory;
pub mod traits;

pub use fs::{FsBlobClient, FsDocumentStore};
pub use memory::{MemoryBlobClient, MemoryDocumentStore, StaticIdentity};
pub use traits::{
    BlobClient, Connectivity, ConnectivityReceiver, DocEvent, DocumentStore, IdentityProvider,
    PutOutcome, StoryQuery, connectivity_channel,
};
