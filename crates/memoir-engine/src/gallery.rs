//! Ephemeral per-edit staging of image additions and removals.

use std::time::{SystemTime, UNIX_EPOCH};

use memoir_remote::{BlobClient, PutOutcome};
use memoir_storage::PendingStore;
use tracing::debug;

use crate::storage_err;

/// One image held by an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub local_uri: String,
    pub remote_path: String,
}

/// Images added and removed during one edit session. Discarded after commit
/// or cancel; never outlives the edit.
pub struct GallerySession {
    owner_id: String,
    images: Vec<GalleryImage>,
    to_delete: Vec<GalleryImage>,
}

impl GallerySession {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            images: Vec::new(),
            to_delete: Vec::new(),
        }
    }

    /// Key a new local image under the owner's remote directory and stage it.
    pub fn stage(&mut self, local_uri: &str, extension: &str) -> GalleryImage {
        let name = local_uri.rsplit('/').next().unwrap_or(local_uri);
        let stem = name.split('.').next().unwrap_or(name);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or(0);
        let image = GalleryImage {
            local_uri: local_uri.to_string(),
            remote_path: format!("images/{}/{stem}-{millis}.{extension}", self.owner_id),
        };
        self.images.push(image.clone());
        image
    }

    /// Re-attach an image that already has a remote key (editing an existing
    /// story).
    pub fn add_image(&mut self, image: GalleryImage) {
        self.images.push(image);
    }

    /// Move an image to the pending-removal set.
    pub fn remove_image(&mut self, image: &GalleryImage) {
        if let Some(pos) = self.images.iter().position(|staged| staged == image) {
            self.to_delete.push(self.images.remove(pos));
        }
    }

    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    pub fn images_to_delete(&self) -> &[GalleryImage] {
        &self.to_delete
    }

    /// Remote paths of the staged images, in staging order — the story's
    /// image list.
    pub fn remote_paths(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|image| image.remote_path.clone())
            .collect()
    }

    /// Flush the session: upload additions, delete removals, and queue
    /// anything that could not be confirmed right away. Consumes the
    /// session.
    pub async fn commit(
        self,
        blobs: &dyn BlobClient,
        pending: &PendingStore,
    ) -> memoir_core::Result<()> {
        for image in &self.images {
            match blobs.put(&image.remote_path, &image.local_uri, None).await {
                Ok(PutOutcome::Complete) => {}
                Ok(PutOutcome::InProgress { session_token }) => {
                    pending
                        .enqueue_upload(
                            &image.remote_path,
                            &image.local_uri,
                            Some(&session_token),
                        )
                        .await
                        .map_err(storage_err)?;
                }
                Err(err) => {
                    debug!("upload of {} deferred: {err}", image.remote_path);
                    pending
                        .enqueue_upload(&image.remote_path, &image.local_uri, None)
                        .await
                        .map_err(storage_err)?;
                }
            }
        }

        for image in &self.to_delete {
            if let Err(err) = blobs.delete(&image.remote_path).await {
                debug!("delete of {} deferred: {err}", image.remote_path);
                pending
                    .enqueue_delete(&image.remote_path)
                    .await
                    .map_err(storage_err)?;
            }
        }

        Ok(())
    }

    /// Drop all staged state without touching the stores.
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_keys_under_owner_directory() {
        let mut session = GallerySession::new("alice");
        let image = session.stage("/home/alice/pics/cat.jpeg", "jpeg");

        assert!(image.remote_path.starts_with("images/alice/cat-"));
        assert!(image.remote_path.ends_with(".jpeg"));
        assert_eq!(session.images().len(), 1);
        assert!(session.images_to_delete().is_empty());
    }

    #[test]
    fn test_remove_moves_image_to_delete_set() {
        let mut session = GallerySession::new("alice");
        let image = session.stage("/tmp/a.png", "png");
        session.remove_image(&image);

        assert!(session.images().is_empty());
        assert_eq!(session.images_to_delete(), &[image]);
    }
}
