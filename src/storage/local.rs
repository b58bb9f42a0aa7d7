//! JSON-file store backend.
//!
//! Keeps the whole registry in memory and rewrites `registry.json` after
//! every mutation, using a temp-file-then-rename write so a crash never
//! leaves a half-written registry behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{
    Canteen, CanteenId, CanteenState, Feed, FeedId, Message, MessageBody, Source, SourceId,
    Subject,
};
use crate::storage::Store;
use crate::storage::registry::Registry;

const REGISTRY_FILE: &str = "registry.json";

/// Store backend persisting the registry to a JSON file.
pub struct LocalStore {
    root_dir: PathBuf,
    registry: Mutex<Registry>,
}

impl LocalStore {
    /// Open a store rooted at the given directory, loading an existing
    /// registry file if present.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let path = root_dir.join(REGISTRY_FILE);
        let registry = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Registry::default(),
            Err(e) => return Err(AppError::Io(e)),
        };
        Ok(Self {
            root_dir,
            registry: Mutex::new(registry),
        })
    }

    /// Write the registry atomically (write to temp, then rename).
    async fn persist(&self, registry: &Registry) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let path = self.root_dir.join(REGISTRY_FILE);
        let tmp = path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(registry)?;

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn feed(&self, id: FeedId) -> Result<Option<Feed>> {
        Ok(self.registry.lock().await.feed(id))
    }

    async fn feeds(&self) -> Result<Vec<Feed>> {
        Ok(self.registry.lock().await.feeds())
    }

    async fn add_feed(&self, name: &str, index_url: &str) -> Result<Feed> {
        let mut registry = self.registry.lock().await;
        let feed = registry.add_feed(name, index_url);
        self.persist(&registry).await?;
        Ok(feed)
    }

    async fn update_feed_url(&self, id: FeedId, new_url: &str) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.update_feed_url(id, new_url)?;
        self.persist(&registry).await
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
        let mut registry = self.registry.lock().await;
        let source = registry.add_source(feed_id, name, meta_url)?;
        self.persist(&registry).await?;
        Ok(source)
    }

    async fn update_source_url(&self, id: SourceId, meta_url: Option<&str>) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.update_source_url(id, meta_url)?;
        self.persist(&registry).await
    }

    async fn canteen(&self, id: CanteenId) -> Result<Option<Canteen>> {
        Ok(self.registry.lock().await.canteen(id))
    }

    async fn set_canteen_state(&self, id: CanteenId, state: CanteenState) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.set_canteen_state(id, state)?;
        self.persist(&registry).await
    }

    async fn append_message(&self, subject: Subject, body: MessageBody) -> Result<Message> {
        let mut registry = self.registry.lock().await;
        let message = registry.append_message(subject, body);
        self.persist(&registry).await?;
        Ok(message)
    }

    async fn messages(&self, subject: Subject) -> Result<Vec<Message>> {
        Ok(self.registry.lock().await.messages(subject))
    }
}
