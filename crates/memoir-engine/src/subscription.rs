//! Live query plumbing: the single-slot subscription resource and the
//! subscribe → query → group → debounce → deliver pipeline.

use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use memoir_core::{Error, Feed, Story, group_stories};
use memoir_remote::{DocEvent, DocumentStore, StoryQuery};
use time::UtcOffset;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Item type delivered by a grouped feed.
pub type FeedItem = memoir_core::Result<Feed>;
/// Item type delivered by a single-story subscription.
pub type StoryItem = memoir_core::Result<Story>;

/// Receiver half of a live query. The stream ends once the underlying
/// pipeline is cancelled or finishes.
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Wait for the next emission. `None` once the subscription is over.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

pub type FeedStream = Subscription<FeedItem>;
pub type StoryStream = Subscription<StoryItem>;

/// Single-slot holder for the active feed task. The two feed modes share it,
/// which keeps them mutually exclusive: clearing the slot aborts whichever
/// pipeline currently owns it.
#[derive(Default)]
pub(crate) struct FeedSlot {
    active: Mutex<Option<JoinHandle<()>>>,
}

impl FeedSlot {
    pub fn store(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.active.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    pub fn clear(&self) {
        if let Some(previous) = self.active.lock().unwrap().take() {
            previous.abort();
        }
    }
}

impl Drop for FeedSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Feed pipeline body: emit the current grouped view, then re-emit on every
/// relevant change notification, coalescing bursts when a debounce window is
/// set.
pub(crate) async fn run_feed(
    docs: Arc<dyn DocumentStore>,
    query: StoryQuery,
    zone: UtcOffset,
    debounce: Option<Duration>,
    tx: mpsc::Sender<FeedItem>,
) {
    let mut events = docs.subscribe();

    if !emit_feed(&docs, &query, zone, &tx).await {
        return;
    }

    loop {
        let event = tokio::select! {
            _ = tx.closed() => return,
            event = events.recv() => event,
        };
        match event {
            Ok(event) if event.owner_id() == query.owner_id => {}
            Ok(_) => continue,
            // Missed notifications still mean the view changed.
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return,
        }

        if let Some(window) = debounce {
            // Absorb the rest of the burst; at most one emission per window
            // even when changes keep arriving.
            let deadline = tokio::time::Instant::now() + window;
            loop {
                match tokio::time::timeout_at(deadline, events.recv()).await {
                    Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) => continue,
                    Ok(Err(RecvError::Closed)) => break,
                    Err(_) => break,
                }
            }
        }

        if !emit_feed(&docs, &query, zone, &tx).await {
            return;
        }
    }
}

/// Query, group, deliver. Transient failures become in-stream errors; the
/// pipeline keeps running. Returns false once the receiver is gone.
async fn emit_feed(
    docs: &Arc<dyn DocumentStore>,
    query: &StoryQuery,
    zone: UtcOffset,
    tx: &mpsc::Sender<FeedItem>,
) -> bool {
    let item = docs
        .query(query)
        .await
        .map(|stories| group_stories(stories, zone));
    tx.send(item).await.is_ok()
}

/// Single-story pipeline body: emit the story now and after every change to
/// it; end with `AlreadyDeleted` once it vanishes.
pub(crate) async fn run_selected(
    docs: Arc<dyn DocumentStore>,
    owner_id: String,
    story_id: String,
    tx: mpsc::Sender<StoryItem>,
) {
    let mut events = docs.subscribe();

    match docs.get(&owner_id, &story_id).await {
        Ok(Some(story)) => {
            if tx.send(Ok(story)).await.is_err() {
                return;
            }
        }
        Ok(None) => {
            let _ = tx.send(Err(Error::NotFound(story_id))).await;
            return;
        }
        Err(err) => {
            if tx.send(Err(err)).await.is_err() {
                return;
            }
        }
    }

    loop {
        let event = tokio::select! {
            _ = tx.closed() => return,
            event = events.recv() => event,
        };
        let event = match event {
            Ok(event) if event.story_id() == story_id => event,
            Ok(_) => continue,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return,
        };
        match event {
            DocEvent::Deleted { .. } => {
                let _ = tx.send(Err(Error::AlreadyDeleted(story_id.clone()))).await;
                return;
            }
            _ => match docs.get(&owner_id, &story_id).await {
                Ok(Some(story)) => {
                    if tx.send(Ok(story)).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    let _ = tx.send(Err(Error::AlreadyDeleted(story_id.clone()))).await;
                    return;
                }
                Err(err) => {
                    if tx.send(Err(err)).await.is_err() {
                        return;
                    }
                }
            },
        }
    }
}
