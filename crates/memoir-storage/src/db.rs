//! Database operations

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::Result;
use crate::models::{PendingDelete, PendingUpload};

const CREATE_UPLOADS: &str = "CREATE TABLE IF NOT EXISTS pending_uploads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_path TEXT NOT NULL,
    source_uri TEXT NOT NULL,
    session_token TEXT
)";

const CREATE_DELETES: &str = "CREATE TABLE IF NOT EXISTS pending_deletes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_path TEXT NOT NULL
)";

/// Durable queue of unconfirmed blob operations. Rows are only removed once
/// the remote operation is confirmed; duplicate paths are legal and each row
/// is resolved independently.
#[derive(Clone)]
pub struct PendingStore {
    pool: SqlitePool,
}

impl PendingStore {
    /// Open (or create) the store, defaulting to the platform data directory.
    pub async fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(path) => path,
            None => default_db_path()?,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(CREATE_UPLOADS).execute(&pool).await?;
        sqlx::query(CREATE_DELETES).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn enqueue_upload(
        &self,
        remote_path: &str,
        source_uri: &str,
        session_token: Option<&str>,
    ) -> Result<PendingUpload> {
        let id = sqlx::query(
            "INSERT INTO pending_uploads (remote_path, source_uri, session_token) VALUES (?, ?, ?)",
        )
        .bind(remote_path)
        .bind(source_uri)
        .bind(session_token)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(PendingUpload {
            id,
            remote_path: remote_path.to_string(),
            source_uri: source_uri.to_string(),
            session_token: session_token.map(str::to_string),
        })
    }

    pub async fn enqueue_delete(&self, remote_path: &str) -> Result<PendingDelete> {
        let id = sqlx::query("INSERT INTO pending_deletes (remote_path) VALUES (?)")
            .bind(remote_path)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(PendingDelete {
            id,
            remote_path: remote_path.to_string(),
        })
    }

    pub async fn list_uploads(&self) -> Result<Vec<PendingUpload>> {
        let uploads = sqlx::query_as::<_, PendingUpload>(
            "SELECT id, remote_path, source_uri, session_token FROM pending_uploads ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(uploads)
    }

    pub async fn list_deletes(&self) -> Result<Vec<PendingDelete>> {
        let deletes = sqlx::query_as::<_, PendingDelete>(
            "SELECT id, remote_path FROM pending_deletes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(deletes)
    }

    /// Replace the resumable-session token after a partial transfer handed
    /// back a newer checkpoint.
    pub async fn update_upload_session(&self, id: i64, session_token: &str) -> Result<()> {
        sqlx::query("UPDATE pending_uploads SET session_token = ? WHERE id = ?")
            .bind(session_token)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove_upload(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM pending_uploads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove_delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM pending_deletes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "memoir", "memoir")
        .ok_or_else(|| anyhow::anyhow!("Could not resolve a data directory"))?;
    Ok(dirs.data_dir().join("pending.db"))
}
