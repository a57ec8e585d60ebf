//! In-memory backends, used by tests and throwaway sessions.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use memoir_core::{Error, Result, Story};
use tokio::sync::broadcast;

use crate::traits::{
    BlobClient, DocEvent, DocumentStore, IdentityProvider, PutOutcome, StoryQuery,
};

/// Document store backed by a process-local map.
pub struct MemoryDocumentStore {
    stories: RwLock<HashMap<String, Story>>,
    events: broadcast::Sender<DocEvent>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            stories: RwLock::new(HashMap::new()),
            events,
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, mut story: Story) -> Result<Story> {
        story.id = uuid::Uuid::new_v4().to_string();
        self.stories
            .write()
            .unwrap()
            .insert(story.id.clone(), story.clone());
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
                    // Not ours; put it back and report absence.
                    stories.insert(story_id.to_string(), other);
                    return Err(Error::NotFound(story_id.to_string()));
                }
                None => return Err(Error::NotFound(story_id.to_string())),
            }
        };
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

/// Blob store backed by a process-local map. Paths can be marked broken to
/// exercise the queued-retry path.
pub struct MemoryBlobClient {
    objects: Mutex<HashMap<String, String>>,
    broken: Mutex<HashSet<String>>,
}

impl MemoryBlobClient {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            broken: Mutex::new(HashSet::new()),
        }
    }

    /// Make operations on `remote_path` fail transiently until healed.
    pub fn break_path(&self, remote_path: &str) {
        self.broken.lock().unwrap().insert(remote_path.to_string());
    }

    pub fn heal(&self, remote_path: &str) {
        self.broken.lock().unwrap().remove(remote_path);
    }

    pub fn contains(&self, remote_path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(remote_path)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn check(&self, remote_path: &str, op: &str) -> Result<()> {
        if self.broken.lock().unwrap().contains(remote_path) {
            return Err(Error::Transient(format!("{op} of {remote_path} failed")));
        }
        Ok(())
    }
}

impl Default for MemoryBlobClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobClient for MemoryBlobClient {
    async fn put(
        &self,
        remote_path: &str,
        source_uri: &str,
        _session_token: Option<&str>,
    ) -> Result<PutOutcome> {
        self.check(remote_path, "put")?;
        self.objects
            .lock()
            .unwrap()
            .insert(remote_path.to_string(), source_uri.to_string());
        Ok(PutOutcome::Complete)
    }

    async fn delete(&self, remote_path: &str) -> Result<()> {
        self.check(remote_path, "delete")?;
        // Deleting an absent object still counts as success.
        self.objects.lock().unwrap().remove(remote_path);
        Ok(())
    }
}

/// Identity provider with a fixed signed-in user, or signed out.
pub struct StaticIdentity {
    identity: Option<String>,
}

impl StaticIdentity {
    pub fn signed_in(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Option<String> {
        self.identity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::Mood;

    fn owned_story(owner: &str) -> Story {
        let mut story = Story::new("t", "d", Mood::Neutral);
        story.owner_id = owner.to_string();
        story
    }

    #[tokio::test]
    async fn test_delete_refuses_foreign_owner() {
        let docs = MemoryDocumentStore::new();
        let story = docs.insert(owned_story("alice")).await.unwrap();

        let result = docs.delete("bob", &story.id).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(docs.get("alice", &story.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_blob_delete_of_absent_object_succeeds() {
        let blobs = MemoryBlobClient::new();
        blobs.delete("images/u1/missing.png").await.unwrap();
    }
}
