use serde::Serialize;

/// A blob upload that has not been confirmed complete remotely. Stays queued
/// until the blob client reports the object present at `remote_path`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PendingUpload {
    pub id: i64,
    pub remote_path: String,
    pub source_uri: String,
    /// Opaque resumable-session token from an earlier partial transfer.
    pub session_token: Option<String>,
}

/// A remote blob that should no longer exist. Stays queued until the delete
/// is confirmed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PendingDelete {
    pub id: i64,
    pub remote_path: String,
}
