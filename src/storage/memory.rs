//! In-memory store backend for tests and dry runs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{
    Canteen, CanteenId, CanteenState, Feed, FeedId, Message, MessageBody, Source, SourceId,
    Subject,
};
use crate::storage::Store;
use crate::storage::registry::Registry;

/// Store backend keeping the registry purely in memory.
#[derive(Default)]
pub struct MemoryStore {
    registry: Mutex<Registry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn feed(&self, id: FeedId) -> Result<Option<Feed>> {
        Ok(self.registry.lock().await.feed(id))
    }

    async fn feeds(&self) -> Result<Vec<Feed>> {
        Ok(self.registry.lock().await.feeds())
    }

    async fn add_feed(&self, name: &str, index_url: &str) -> Result<Feed> {
        Ok(self.registry.lock().await.add_feed(name, index_url))
    }

    async fn update_feed_url(&self, id: FeedId, new_url: &str) -> Result<()> {
        self.registry.lock().await.update_feed_url(id, new_url)
    }

    async fn sources_by_feed(&self, feed_id: FeedId) -> Result<Vec<Source>> {
        Ok(self.registry.lock().await.sources_by_feed(feed_id))
    }

    async fn add_source(
        &self,
        feed_id: FeedId,
        name: &str,
        meta_url: Option<&str>,
    ) -> Result<Source> {
        self.registry.lock().await.add_source(feed_id, name, meta_url)
    }

    async fn update_source_url(&self, id: SourceId, meta_url: Option<&str>) -> Result<()> {
        self.registry.lock().await.update_source_url(id, meta_url)
    }

    async fn canteen(&self, id: CanteenId) -> Result<Option<Canteen>> {
        Ok(self.registry.lock().await.canteen(id))
    }

    async fn set_canteen_state(&self, id: CanteenId, state: CanteenState) -> Result<()> {
        self.registry.lock().await.set_canteen_state(id, state)
    }

    async fn append_message(&self, subject: Subject, body: MessageBody) -> Result<Message> {
        Ok(self.registry.lock().await.append_message(subject, body))
    }

    async fn messages(&self, subject: Subject) -> Result<Vec<Message>> {
        Ok(self.registry.lock().await.messages(subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_roundtrip() {
        let store = MemoryStore::new();
        let feed = store
            .add_feed("uni", "http://example.org/index.json")
            .await
            .unwrap();

        let loaded = store.feed(feed.id).await.unwrap().unwrap();
        assert_eq!(loaded, feed);
        assert!(store.feed(feed.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_feed_url() {
        let store = MemoryStore::new();
        let feed = store
            .add_feed("uni", "http://example.org/old.json")
            .await
            .unwrap();

        store
            .update_feed_url(feed.id, "http://example.org/new.json")
            .await
            .unwrap();
        let loaded = store.feed(feed.id).await.unwrap().unwrap();
        assert_eq!(loaded.index_url, "http://example.org/new.json");
    }

    #[tokio::test]
    async fn test_sources_keep_insertion_order() {
        let store = MemoryStore::new();
        let feed = store
            .add_feed("uni", "http://example.org/index.json")
            .await
            .unwrap();
        for name in ["a", "b", "c"] {
            store.add_source(feed.id, name, None).await.unwrap();
        }

        let names: Vec<String> = store
            .sources_by_feed(feed.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
