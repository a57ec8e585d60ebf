use std::sync::Arc;

use anyhow::Result;
use memoir_engine::Reconciler;

use super::AppContext;

pub async fn run(app: &AppContext) -> Result<()> {
    Reconciler::new(app.pending.clone(), Arc::clone(&app.blobs))
        .run_once()
        .await;

    let uploads = app.pending.list_uploads().await?;
    let deletes = app.pending.list_deletes().await?;
    if uploads.is_empty() && deletes.is_empty() {
        println!("✓ All blob operations confirmed");
    } else {
        println!(
            "{} upload(s) and {} delete(s) still queued",
            uploads.len(),
            deletes.len()
        );
    }
    Ok(())
}

pub async fn pending(app: &AppContext) -> Result<()> {
    let uploads = app.pending.list_uploads().await?;
    let deletes = app.pending.list_deletes().await?;

    if uploads.is_empty() && deletes.is_empty() {
        println!("No queued blob operations.");
        return Ok(());
    }

    if !uploads.is_empty() {
        println!("Queued uploads:");
        for upload in uploads {
            let resumable = if upload.session_token.is_some() {
                "resumable"
            } else {
                "from start"
            };
            println!("  [{}] {} ({})", upload.id, upload.remote_path, resumable);
        }
    }
    if !deletes.is_empty() {
        println!("Queued deletes:");
        for delete in deletes {
            println!("  [{}] {}", delete.id, delete.remote_path);
        }
    }
    Ok(())
}
