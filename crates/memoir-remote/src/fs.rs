//! Local filesystem backends: a JSON document file and a blob directory.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use memoir_core::{Error, Result, Story};
use tokio::sync::broadcast;

use crate::traits::{BlobClient, DocEvent, DocumentStore, PutOutcome, StoryQuery};

/// Document store persisted as one JSON file. Loaded once at open; every
/// mutation rewrites the file.
pub struct FsDocumentStore {
    path: PathBuf,
    stories: RwLock<HashMap<String, Story>>,
    events: broadcast::Sender<DocEvent>,
}

impl FsDocumentStore {
    pub async fn open(path: PathBuf) -> Result<Self> {
        let stories = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        let (events, _) = broadcast::channel(64);
        Ok(Self {
            path,
            stories: RwLock::new(stories),
            events,
        })
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.stories.read().unwrap().clone();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn insert(&self, mut story: Story) -> Result<Story> {
        story.id = uuid::Uuid::new_v4().to_string();
        self.stories
            .write()
            .unwrap()
            .insert(story.id.clone(), story.clone());
        self.persist().await?;
        let _ = self.events.send(DocEvent::Created {
            owner_id: story.owner_id.clone(),
            story_id: story.id.clone(),
        });
        Ok(story)
    }

    async fn update(&self, story: Story) -> Result<Story> {
        let updated = {
            let mut stories = self.stories.write().unwrap();
            let existing = stories
                .get_mut(&story.id)
                .ok_or_else(|| Error::NotFound(story.id.clone()))?;
            existing.title = story.title;
            existing.description = story.description;
            existing.mood = story.mood;
            existing.images = story.images;
            existing.date = story.date;
            existing.clone()
        };
        self.persist().await?;
        let _ = self.events.send(DocEvent::Updated {
            owner_id: updated.owner_id.clone(),
            story_id: updated.id.clone(),
        });
        Ok(updated)
    }

    async fn get(&self, owner_id: &str, story_id: &str) -> Result<Option<Story>> {
        let stories = self.stories.read().unwrap();
        Ok(stories
            .get(story_id)
            .filter(|story| story.owner_id == owner_id)
            .cloned())
    }

    async fn delete(&self, owner_id: &str, story_id: &str) -> Result<Story> {
        let story = {
            let mut stories = self.stories.write().unwrap();
            match stories.remove(story_id) {
                Some(story) if story.owner_id == owner_id => story,
                Some(other) => {
                    stories.insert(story_id.to_string(), other);
                    return Err(Error::NotFound(story_id.to_string()));
                }
                None => return Err(Error::NotFound(story_id.to_string())),
            }
        };
        self.persist().await?;
        let _ = self.events.send(DocEvent::Deleted {
            owner_id: story.owner_id.clone(),
            story_id: story.id.clone(),
        });
        Ok(story)
    }

    async fn delete_owned(&self, owner_id: &str) -> Result<Vec<Story>> {
        let deleted: Vec<Story> = {
            let mut stories = self.stories.write().unwrap();
            let ids: Vec<String> = stories
                .values()
                .filter(|story| story.owner_id == owner_id)
                .map(|story| story.id.clone())
                .collect();
            ids.iter().filter_map(|id| stories.remove(id)).collect()
        };
        self.persist().await?;
        for story in &deleted {
            let _ = self.events.send(DocEvent::Deleted {
                owner_id: story.owner_id.clone(),
                story_id: story.id.clone(),
            });
        }
        Ok(deleted)
    }

    async fn query(&self, query: &StoryQuery) -> Result<Vec<Story>> {
        let stories = self.stories.read().unwrap();
        Ok(stories
            .values()
            .filter(|story| story.owner_id == query.owner_id)
            .filter(|story| match query.window {
                Some((start, end)) => story.date >= start && story.date < end,
                None => true,
            })
            .cloned()
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<DocEvent> {
        self.events.subscribe()
    }
}

/// Blob client that copies local files under a root directory.
pub struct FsBlobClient {
    root: PathBuf,
}

impl FsBlobClient {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl BlobClient for FsBlobClient {
    async fn put(
        &self,
        remote_path: &str,
        source_uri: &str,
        _session_token: Option<&str>,
    ) -> Result<PutOutcome> {
        let source = source_uri.strip_prefix("file:").unwrap_or(source_uri);
        let target = self.root.join(remote_path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(source, &target).await?;
        Ok(PutOutcome::Complete)
    }

    async fn delete(&self, remote_path: &str) -> Result<()> {
        match tokio::fs::remove_file(self.root.join(remote_path)).await {
            Ok(()) => Ok(()),
            // Absent objects are fine; the intent is already satisfied.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::Mood;

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("stories.json");

        let docs = FsDocumentStore::open(path.clone()).await.unwrap();
        let mut story = Story::new("first entry", "a fine day", Mood::Happy);
        story.owner_id = "alice".to_string();
        let story = docs.insert(story).await.unwrap();
        drop(docs);

        let reopened = FsDocumentStore::open(path).await.unwrap();
        let loaded = reopened.get("alice", &story.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "first entry");
        assert_eq!(loaded.mood, Mood::Happy);
    }

    #[tokio::test]
    async fn test_blob_round_trip_and_idempotent_delete() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("photo.png");
        tokio::fs::write(&source, b"pixels").await.unwrap();

        let blobs = FsBlobClient::new(temp.path().join("blobs"));
        blobs
            .put("images/u1/photo.png", &source.to_string_lossy(), None)
            .await
            .unwrap();
        assert!(temp.path().join("blobs/images/u1/photo.png").exists());

        blobs.delete("images/u1/photo.png").await.unwrap();
        blobs.delete("images/u1/photo.png").await.unwrap();
    }
}
