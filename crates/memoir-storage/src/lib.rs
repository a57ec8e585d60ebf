//! Durable pending-operation store for memoir
//!
//! This crate provides:
//! - SQLite-backed queue of unconfirmed blob uploads and deletes
//! - Crash durability: queued intents survive process restarts

pub mod db;
pub mod error;
pub mod models;

pub use db::PendingStore;
pub use error::{Result, StorageError};
pub use models::{PendingDelete, PendingUpload};
